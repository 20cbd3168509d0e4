//! Webmention Receiver - admits, queues and verifies link notifications.
//!
//! A sender claims "source page S links to target page T". The receiver
//! validates the claim's shape, queues it, and later fetches S to check
//! for T before recording the result.
//!
//! # Pipeline
//!
//! ```text
//! POST / ─▶ validation ─▶ queue (admission gates) ─▶ verifier tick ─▶ store files
//! ```
//!
//! - [`validation`]: pure checks on the raw request
//! - [`queue`]: deduplicating FIFO and the admission policy
//! - [`verifier`]: periodic fetch-and-classify task
//! - [`persistence`]: the notification store and failure counts
//! - [`context`]: the shared state tying them together
//! - [`server`]: axum routes

pub mod config;
pub mod context;
pub mod persistence;
pub mod queue;
pub mod server;
pub mod types;
pub mod validation;
pub mod verifier;

#[cfg(test)]
pub mod test_utils;
