//! Process configuration.
//!
//! Every setting is available as a command-line flag and as a
//! `WEBMENTION_*` environment variable, with the flag taking precedence.
//!
//! # Allow-list file
//!
//! The optional allow-list restricts which targets may be mentioned:
//!
//! ```json
//! { "urls": ["https://b.example/", "https://blog.b.example/posts/"] }
//! ```
//!
//! A target is allowed if it starts with any listed prefix. An empty or
//! absent list allows every target.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::persistence::{StoreError, read_json_if_exists};
use crate::queue::admission::DEFAULT_MAX_QUEUE_DEPTH;

/// Default verifier tick (500 milliseconds).
const DEFAULT_VERIFY_INTERVAL_MS: u64 = 500;

/// Default timeout for fetching a source page (10 seconds).
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Default cap on a fetched source body (1 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Errors loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The allow-list file was configured but does not exist.
    #[error("allow-list file not found: {0}")]
    AllowListMissing(PathBuf),

    /// The allow-list file could not be read or parsed.
    #[error("invalid allow-list: {0}")]
    AllowList(#[from] StoreError),
}

/// Command-line and environment configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "webmention-receiver", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "WEBMENTION_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// File holding verified notifications.
    #[arg(long, env = "WEBMENTION_MENTIONS_FILE", default_value = "webmentions.json")]
    pub mentions_file: PathBuf,

    /// File holding per-source failure counts.
    #[arg(long, env = "WEBMENTION_FAILURES_FILE", default_value = "failures.json")]
    pub failures_file: PathBuf,

    /// Optional JSON file of allowed target prefixes (`{"urls": [...]}`).
    #[arg(long, env = "WEBMENTION_ALLOW_LIST")]
    pub allow_list: Option<PathBuf>,

    /// Milliseconds between verifier ticks.
    #[arg(
        long,
        env = "WEBMENTION_VERIFY_INTERVAL_MS",
        default_value_t = DEFAULT_VERIFY_INTERVAL_MS
    )]
    pub verify_interval_ms: u64,

    /// Seconds before a source fetch is abandoned and counted as a failure.
    #[arg(
        long,
        env = "WEBMENTION_FETCH_TIMEOUT_SECS",
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECS
    )]
    pub fetch_timeout_secs: u64,

    /// Maximum number of mentions waiting for verification.
    #[arg(long, env = "WEBMENTION_MAX_QUEUE_DEPTH", default_value_t = DEFAULT_MAX_QUEUE_DEPTH)]
    pub max_queue_depth: usize,

    /// Maximum bytes read from a source page.
    #[arg(long, env = "WEBMENTION_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,
}

impl Config {
    pub fn verify_interval(&self) -> Duration {
        Duration::from_millis(self.verify_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Loads the configured allow-list, or an empty one if none is set.
    pub fn load_allow_list(&self) -> Result<AllowList, ConfigError> {
        match &self.allow_list {
            Some(path) => AllowList::load(path),
            None => Ok(AllowList::default()),
        }
    }
}

/// Target URL prefixes accepted by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    #[serde(default)]
    pub urls: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AllowList {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Reads an allow-list file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        read_json_if_exists(path)?.ok_or_else(|| ConfigError::AllowListMissing(path.to_path_buf()))
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Returns true if `target` starts with any listed prefix.
    ///
    /// Callers decide what an empty list means; this returns false for it.
    pub fn matches(&self, target: &str) -> bool {
        self.urls.iter().any(|prefix| target.starts_with(prefix.as_str()))
    }
}
