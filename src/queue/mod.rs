//! Pending mentions and the policy that decides who may join them.
//!
//! - [`pending`]: the deduplicating FIFO itself
//! - [`admission`]: the gates a mention must pass before it is queued

pub mod admission;
pub mod pending;

pub use admission::{AdmissionError, AdmissionPolicy, check_admission};
pub use pending::PendingQueue;
