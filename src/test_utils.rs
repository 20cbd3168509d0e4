//! Shared test fixtures.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tempfile::{TempDir, tempdir};

use crate::config::AllowList;
use crate::context::ReceiverContext;
use crate::persistence::{FailureCounter, NotificationStore};
use crate::queue::{AdmissionError, AdmissionPolicy, PendingQueue, check_admission};
use crate::types::Mention;

pub const SOURCE: &str = "https://a.example/post";
pub const TARGET: &str = "https://b.example/page";

pub fn mention() -> Mention {
    Mention::new(SOURCE, TARGET)
}

/// A context whose files live under `dir`.
pub fn context_in(dir: &Path, allow_list: AllowList) -> Arc<ReceiverContext> {
    Arc::new(ReceiverContext::new(
        allow_list,
        AdmissionPolicy::new(),
        NotificationStore::empty(dir.join("webmentions.json")),
        FailureCounter::empty(dir.join("failures.json")),
    ))
}

/// A context backed by a fresh temporary directory.
pub fn test_context(allow_list: AllowList) -> (Arc<ReceiverContext>, TempDir) {
    let dir = tempdir().unwrap();
    let context = context_in(dir.path(), allow_list);
    (context, dir)
}

/// Puts a non-empty directory at `path` so an atomic write to it fails.
pub fn block_path(path: &Path) {
    std::fs::create_dir_all(path.join("occupied")).unwrap();
}

/// Queue, store and counts held directly, for exercising the admission
/// gates without a context.
pub struct AdmissionFixture {
    pub policy: AdmissionPolicy,
    pub queue: PendingQueue,
    pub store: NotificationStore,
    pub failures: FailureCounter,
}

impl AdmissionFixture {
    pub fn new() -> Self {
        AdmissionFixture {
            policy: AdmissionPolicy::new(),
            queue: PendingQueue::new(),
            store: NotificationStore::empty("unused-webmentions.json"),
            failures: FailureCounter::empty("unused-failures.json"),
        }
    }

    pub fn check(&self, mention: &Mention, now: DateTime<Utc>) -> Result<(), AdmissionError> {
        check_admission(
            &self.policy,
            &self.queue,
            &self.store,
            &self.failures,
            mention,
            now,
        )
    }
}
