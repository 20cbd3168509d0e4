//! The receiver's shared application context.
//!
//! Built once at startup and shared (behind an `Arc`) by the HTTP endpoint
//! and the verifier. The endpoint only reads the store and failure counts and
//! pushes onto the queue. The verifier is the only writer of the store and
//! the failure counts.
//!
//! All mutable state sits behind one lock. The lock is held for in-memory
//! work and the synchronous file write that follows a verification, never
//! across a network fetch.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::AllowList;
use crate::persistence::store::Upsert;
use crate::persistence::{FailureCounter, NotificationStore, StoreError};
use crate::queue::{AdmissionError, AdmissionPolicy, PendingQueue, check_admission};
use crate::types::{Mention, Notification, VerifiedStatus};

/// Queue, store and failure counts, mutated together under one lock.
#[derive(Debug)]
pub struct ReceiverState {
    pub queue: PendingQueue,
    pub store: NotificationStore,
    pub failures: FailureCounter,
}

/// Process-wide state and settings for the receiver.
#[derive(Debug)]
pub struct ReceiverContext {
    allow_list: AllowList,
    policy: AdmissionPolicy,
    state: Mutex<ReceiverState>,
}

impl ReceiverContext {
    pub fn new(
        allow_list: AllowList,
        policy: AdmissionPolicy,
        store: NotificationStore,
        failures: FailureCounter,
    ) -> Self {
        ReceiverContext {
            allow_list,
            policy,
            state: Mutex::new(ReceiverState {
                queue: PendingQueue::new(),
                store,
                failures,
            }),
        }
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Returns true if `mention` would be admitted at `now`.
    pub async fn is_enqueueable(&self, mention: &Mention, now: DateTime<Utc>) -> bool {
        let state = self.state.lock().await;
        self.check(&state, mention, now).is_ok()
    }

    /// Queues `mention` if every admission gate passes.
    pub async fn submit(&self, mention: Mention, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        let mut state = self.state.lock().await;
        self.check(&state, &mention, now)?;
        state.queue.push(mention);
        Ok(())
    }

    /// Removes the oldest pending mention.
    pub async fn next_pending(&self) -> Option<Mention> {
        self.state.lock().await.queue.pop()
    }

    /// Records a successful or "gone" verification and persists the store.
    ///
    /// The failure counts file is not written. If the write fails the
    /// in-memory record is put back, so memory never runs ahead of disk.
    pub async fn record_verified(
        &self,
        mention: &Mention,
        status: VerifiedStatus,
        at: DateTime<Utc>,
    ) -> Result<Upsert, StoreError> {
        let mut state = self.state.lock().await;
        let previous = state.store.find(&mention.source, &mention.target).cloned();
        let upsert = state.store.upsert(mention, status, at);
        if let Err(e) = state.store.persist() {
            state.store.restore(mention, previous);
            return Err(e);
        }
        debug!(mention = %mention, ?status, ?upsert, "Recorded verification");
        Ok(upsert)
    }

    /// Counts a failed verification against the mention's source and
    /// persists the failure counts. The store is not touched.
    ///
    /// If the write fails the count is put back.
    pub async fn record_failure(&self, mention: &Mention) -> Result<u32, StoreError> {
        let mut state = self.state.lock().await;
        let previous = state.failures.count(&mention.source);
        let failures = state.failures.increment(&mention.source);
        if let Err(e) = state.failures.persist() {
            state.failures.restore(&mention.source, previous);
            return Err(e);
        }
        Ok(failures)
    }

    pub async fn queue_len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    /// Returns a copy of the stored record for a pair.
    pub async fn find(&self, source: &str, target: &str) -> Option<Notification> {
        self.state.lock().await.store.find(source, target).cloned()
    }

    pub async fn failure_count(&self, source: &str) -> u32 {
        self.state.lock().await.failures.count(source)
    }

    /// Returns the number of records in the store.
    pub async fn stored_len(&self) -> usize {
        self.state.lock().await.store.len()
    }

    fn check(
        &self,
        state: &ReceiverState,
        mention: &Mention,
        now: DateTime<Utc>,
    ) -> Result<(), AdmissionError> {
        check_admission(
            &self.policy,
            &state.queue,
            &state.store,
            &state.failures,
            mention,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{block_path, context_in, mention, test_context};
    use chrono::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn submit_then_duplicate_submit() {
        let (ctx, _dir) = test_context(AllowList::default());

        assert_eq!(ctx.submit(mention(), Utc::now()).await, Ok(()));
        assert_eq!(
            ctx.submit(mention(), Utc::now()).await,
            Err(AdmissionError::AlreadyQueued)
        );
        assert_eq!(ctx.queue_len().await, 1);
    }

    #[tokio::test]
    async fn rejected_submit_has_no_side_effect() {
        let (ctx, _dir) = test_context(AllowList::default());
        ctx.submit(mention(), Utc::now()).await.unwrap();
        let _ = ctx.submit(mention(), Utc::now()).await;

        assert_eq!(ctx.next_pending().await, Some(mention()));
        assert_eq!(ctx.next_pending().await, None);
    }

    #[tokio::test]
    async fn record_verified_writes_only_store_file() {
        let (ctx, dir) = test_context(AllowList::default());

        ctx.record_verified(&mention(), VerifiedStatus::Mentioned(true), Utc::now())
            .await
            .unwrap();

        assert!(dir.path().join("webmentions.json").exists());
        assert!(!dir.path().join("failures.json").exists());
    }

    #[tokio::test]
    async fn record_failure_writes_only_failures_file() {
        let (ctx, dir) = test_context(AllowList::default());

        assert_eq!(ctx.record_failure(&mention()).await.unwrap(), 1);

        assert!(dir.path().join("failures.json").exists());
        assert!(!dir.path().join("webmentions.json").exists());
        assert_eq!(ctx.failure_count(&mention().source).await, 1);
        assert!(ctx.find(&mention().source, &mention().target).await.is_none());
    }

    #[tokio::test]
    async fn verified_pair_blocks_resubmission_until_window_passes() {
        let (ctx, _dir) = test_context(AllowList::default());
        let verified_at = Utc::now();
        ctx.record_verified(&mention(), VerifiedStatus::Mentioned(true), verified_at)
            .await
            .unwrap();

        assert!(!ctx.is_enqueueable(&mention(), verified_at).await);
        assert!(
            ctx.is_enqueueable(&mention(), verified_at + Duration::hours(25))
                .await
        );
    }

    #[tokio::test]
    async fn failed_store_write_leaves_pair_enqueueable() {
        let dir = tempdir().unwrap();
        block_path(&dir.path().join("webmentions.json"));
        let ctx = context_in(dir.path(), AllowList::default());
        let now = Utc::now();

        let result = ctx
            .record_verified(&mention(), VerifiedStatus::Mentioned(true), now)
            .await;

        assert!(result.is_err());
        assert!(ctx.find(&mention().source, &mention().target).await.is_none());
        assert_eq!(ctx.stored_len().await, 0);
        assert!(ctx.is_enqueueable(&mention(), now).await);
    }

    #[tokio::test]
    async fn failed_store_write_keeps_previous_record() {
        let dir = tempdir().unwrap();
        let store_path = dir.path().join("webmentions.json");
        let ctx = context_in(dir.path(), AllowList::default());
        let first = Utc::now() - Duration::hours(30);
        ctx.record_verified(&mention(), VerifiedStatus::Mentioned(true), first)
            .await
            .unwrap();

        std::fs::remove_file(&store_path).unwrap();
        block_path(&store_path);
        let result = ctx
            .record_verified(&mention(), VerifiedStatus::Deleted, Utc::now())
            .await;

        assert!(result.is_err());
        let record = ctx.find(&mention().source, &mention().target).await.unwrap();
        assert_eq!(record.validated_at, first);
        assert_eq!(record.mentioned, Some(true));
        assert_eq!(record.deleted, None);
        assert!(ctx.is_enqueueable(&mention(), Utc::now()).await);
    }

    #[tokio::test]
    async fn failed_failures_write_leaves_count_unchanged() {
        let dir = tempdir().unwrap();
        block_path(&dir.path().join("failures.json"));
        let ctx = context_in(dir.path(), AllowList::default());

        assert!(ctx.record_failure(&mention()).await.is_err());
        assert_eq!(ctx.failure_count(&mention().source).await, 0);
    }
}
