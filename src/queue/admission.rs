//! Enqueueability policy.
//!
//! A valid mention joins the queue only if every gate passes:
//!
//! - **not already queued**: the same pair is not waiting
//! - **failure budget**: its source has failed verification at most
//!   [`DEFAULT_FAILURE_BUDGET`] times. This is per source, so a broken
//!   source is cut off whatever target it claims
//! - **freshness**: the pair was not verified within the last
//!   [`DEFAULT_FRESHNESS_HOURS`] hours. Older records may be re-verified
//!   since pages change
//! - **queue depth**: the queue is below its configured cap
//!
//! Rejections carry no side effects. They are surfaced to senders as
//! "try later", not as client errors.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use super::pending::PendingQueue;
use crate::persistence::{FailureCounter, NotificationStore};
use crate::types::Mention;

/// Failures tolerated per source before it is refused.
pub const DEFAULT_FAILURE_BUDGET: u32 = 5;

/// Hours after a verification before the same pair may be re-verified.
pub const DEFAULT_FRESHNESS_HOURS: i64 = 24;

/// Default cap on pending mentions.
pub const DEFAULT_MAX_QUEUE_DEPTH: usize = 10_000;

/// Why a valid mention was not queued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("mention is already queued")]
    AlreadyQueued,

    #[error("source has failed verification {failures} times")]
    FailureBudgetExhausted { failures: u32 },

    #[error("mention was verified at {validated_at}")]
    RecentlyVerified { validated_at: DateTime<Utc> },

    #[error("queue is full ({depth} pending)")]
    QueueFull { depth: usize },
}

/// Thresholds applied at admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// A source is refused once its failure count exceeds this.
    pub failure_budget: u32,

    /// Minimum age of a verified record before the pair is re-admitted.
    pub freshness_window: Duration,

    /// Maximum number of pending mentions.
    pub max_queue_depth: usize,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl AdmissionPolicy {
    pub fn new() -> Self {
        AdmissionPolicy {
            failure_budget: DEFAULT_FAILURE_BUDGET,
            freshness_window: Duration::hours(DEFAULT_FRESHNESS_HOURS),
            max_queue_depth: DEFAULT_MAX_QUEUE_DEPTH,
        }
    }

    pub fn with_max_queue_depth(mut self, max_queue_depth: usize) -> Self {
        self.max_queue_depth = max_queue_depth;
        self
    }
}

/// Decides whether `mention` may be queued at time `now`.
pub fn check_admission(
    policy: &AdmissionPolicy,
    queue: &PendingQueue,
    store: &NotificationStore,
    failures: &FailureCounter,
    mention: &Mention,
    now: DateTime<Utc>,
) -> Result<(), AdmissionError> {
    if queue.contains(mention) {
        return Err(AdmissionError::AlreadyQueued);
    }

    let count = failures.count(&mention.source);
    if count > policy.failure_budget {
        return Err(AdmissionError::FailureBudgetExhausted { failures: count });
    }

    if let Some(record) = store.find(&mention.source, &mention.target)
        && record.is_fresh(now, policy.freshness_window)
    {
        return Err(AdmissionError::RecentlyVerified {
            validated_at: record.validated_at,
        });
    }

    if queue.len() >= policy.max_queue_depth {
        return Err(AdmissionError::QueueFull { depth: queue.len() });
    }

    Ok(())
}
