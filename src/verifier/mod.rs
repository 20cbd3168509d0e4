//! Asynchronous verification of queued mentions.
//!
//! The verifier runs as a single tokio task on a fixed tick. Each tick pops
//! at most one mention, fetches its source, and records the outcome. This
//! bounds the receiver's outbound fetch rate regardless of queue depth.
//!
//! # Module Structure
//!
//! - [`fetch`]: the [`SourceFetcher`] seam and its reqwest implementation
//! - [`outcome`]: classification of a fetch into verified, gone or failed
//! - [`worker`]: the tick loop and per-item state machine

pub mod fetch;
pub mod outcome;
pub mod worker;

pub use fetch::{FetchError, HttpFetcher, SourceFetcher, SourcePage};
pub use outcome::{FailureReason, VerificationOutcome, classify};
pub use worker::{Tick, Verifier, VerifierError};
