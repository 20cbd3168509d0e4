//! The notification store: verified mentions, keyed by (source, target).
//!
//! The store holds one record per pair. Re-verifying a pair after the
//! freshness window updates the existing record in place rather than
//! appending a second one.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Result;
use super::atomic::{read_json_if_exists, write_json_atomic};
use crate::types::{Mention, Notification, VerifiedStatus};

/// On-disk shape of the notifications file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub webmentions: Vec<Notification>,
}

/// Whether an upsert created a record or updated an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Updated,
}

/// Verified notifications, backed by a single JSON file.
#[derive(Debug)]
pub struct NotificationStore {
    path: PathBuf,
    document: StoreDocument,
}

impl NotificationStore {
    /// Loads the store from `path`. A missing file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = read_json_if_exists::<StoreDocument>(&path)?.unwrap_or_default();
        debug!(
            path = %path.display(),
            records = document.webmentions.len(),
            "Loaded notification store"
        );
        Ok(NotificationStore { path, document })
    }

    /// Creates an empty store that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        NotificationStore {
            path: path.into(),
            document: StoreDocument::default(),
        }
    }

    /// Finds the record for a (source, target) pair.
    pub fn find(&self, source: &str, target: &str) -> Option<&Notification> {
        self.document
            .webmentions
            .iter()
            .find(|n| n.source == source && n.target == target)
    }

    /// Records a verification result, updating the existing record for the
    /// pair if there is one.
    pub fn upsert(
        &mut self,
        mention: &Mention,
        status: VerifiedStatus,
        at: DateTime<Utc>,
    ) -> Upsert {
        match self
            .document
            .webmentions
            .iter_mut()
            .find(|n| n.is_for(mention))
        {
            Some(existing) => {
                existing.apply(status, at);
                Upsert::Updated
            }
            None => {
                self.document
                    .webmentions
                    .push(Notification::verified(mention, status, at));
                Upsert::Inserted
            }
        }
    }

    /// Puts the pair's record back to `previous`, removing it if there was
    /// none. Undoes an upsert whose write failed.
    pub fn restore(&mut self, mention: &Mention, previous: Option<Notification>) {
        let position = self
            .document
            .webmentions
            .iter()
            .position(|n| n.is_for(mention));
        match (position, previous) {
            (Some(i), Some(record)) => self.document.webmentions[i] = record,
            (Some(i), None) => {
                self.document.webmentions.remove(i);
            }
            (None, Some(record)) => self.document.webmentions.push(record),
            (None, None) => {}
        }
    }

    /// Writes the whole store to disk.
    pub fn persist(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.document)
    }

    /// Returns all records in insertion order.
    pub fn records(&self) -> &[Notification] {
        &self.document.webmentions
    }

    pub fn len(&self) -> usize {
        self.document.webmentions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document.webmentions.is_empty()
    }
}
