//! The verifier tick loop.
//!
//! # Per-item State Machine
//!
//! 1. Pop the oldest pending mention; if there is none the tick is idle
//! 2. Fetch the mention's source
//! 3. Classify:
//!    - 2xx: upsert the store with `mentioned` = body contains target
//!    - 410: upsert the store with `deleted`
//!    - anything else: increment the source's failure count
//! 4. Persist exactly the file that changed
//!
//! A failed mention is not re-queued. Only its failure count survives; the
//! sender has to resubmit.
//!
//! # Scheduling
//!
//! Ticks fire on a fixed interval and are awaited inline, so they never
//! overlap. An error in one tick is logged and the loop carries on; only the
//! shutdown token stops it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use super::fetch::SourceFetcher;
use super::outcome::{VerificationOutcome, classify};
use crate::context::ReceiverContext;
use crate::persistence::StoreError;
use crate::persistence::store::Upsert;
use crate::types::{Mention, VerifiedStatus};

/// Default time between ticks.
pub const DEFAULT_VERIFY_INTERVAL: Duration = Duration::from_millis(500);

/// Errors that abandon a single tick.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Persisting the outcome failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// What a single tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// The queue was empty.
    Idle,

    /// The source answered and the store was updated.
    Verified {
        mention: Mention,
        status: VerifiedStatus,
        upsert: Upsert,
    },

    /// Verification failed and the source's failure count was bumped.
    Failed { mention: Mention, failures: u32 },
}

/// Drains the pending queue one mention per tick.
pub struct Verifier<F> {
    context: Arc<ReceiverContext>,
    fetcher: F,
    interval: Duration,
}

impl<F: SourceFetcher> Verifier<F> {
    pub fn new(context: Arc<ReceiverContext>, fetcher: F) -> Self {
        Verifier {
            context,
            fetcher,
            interval: DEFAULT_VERIFY_INTERVAL,
        }
    }

    /// Sets the time between ticks. Zero is raised to one millisecond.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs ticks until `shutdown` is cancelled.
    #[instrument(skip_all, fields(interval_ms = self.interval.as_millis() as u64))]
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Verifier started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping verifier");
                    break;
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.verify_next().await {
                        error!(error = %e, "Verifier tick failed");
                    }
                }
            }
        }

        info!("Verifier stopped");
    }

    /// Processes at most one pending mention.
    pub async fn verify_next(&self) -> Result<Tick, VerifierError> {
        let Some(mention) = self.context.next_pending().await else {
            return Ok(Tick::Idle);
        };

        debug!(mention = %mention, "Fetching source");
        let fetched = self.fetcher.fetch(&mention.source).await;

        match classify(fetched, &mention.target) {
            VerificationOutcome::Verified(status) => {
                let upsert = self
                    .context
                    .record_verified(&mention, status, Utc::now())
                    .await?;
                info!(
                    source = %mention.source,
                    target = %mention.target,
                    ?status,
                    "Mention verified"
                );
                Ok(Tick::Verified {
                    mention,
                    status,
                    upsert,
                })
            }
            VerificationOutcome::Failed(reason) => {
                let failures = self.context.record_failure(&mention).await?;
                warn!(
                    source = %mention.source,
                    target = %mention.target,
                    failures,
                    reason = %reason,
                    "Mention verification failed"
                );
                Ok(Tick::Failed { mention, failures })
            }
        }
    }
}
