//! Durable storage for verification results.
//!
//! Two JSON files back the receiver:
//!
//! ```text
//! webmentions.json   { "webmentions": [ { source, target, validated,
//!                                         mentioned|deleted, validatedAt } ] }
//! failures.json      { "<source url>": <count>, ... }
//! ```
//!
//! Each file is loaded once at startup and rewritten in full after every
//! mutation. There is no incremental write path. Writes go through
//! [`atomic::write_json_atomic`] so a crash mid-write leaves the previous
//! version in place.

pub mod atomic;
pub mod failures;
pub mod store;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use atomic::{read_json_if_exists, write_json_atomic};
pub use failures::FailureCounter;
pub use store::NotificationStore;

/// Errors from loading or persisting a store file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error while reading or writing the file.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file contents are not valid JSON for the expected shape.
    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
