//! Verified notification records as kept in the notification store.
//!
//! A record is only ever created by the verifier, so every stored record has
//! `validated = true` and a `validatedAt` timestamp. Exactly one of
//! `mentioned` or `deleted` is present:
//!
//! - `mentioned` (true or false): the source answered 2xx, and the flag says
//!   whether the target string appeared in its body
//! - `deleted` (always true): the source answered 410 Gone
//!
//! The JSON shape uses camelCase keys so existing store files stay readable.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::mention::Mention;

/// The verification result recorded for a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifiedStatus {
    /// The source was reachable. `true` if the target string was found in it.
    Mentioned(bool),

    /// The source reported 410 Gone.
    Deleted,
}

/// A stored, verified notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub source: String,
    pub target: String,

    #[serde(default)]
    pub validated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mentioned: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,

    pub validated_at: DateTime<Utc>,
}

impl Notification {
    /// Creates a freshly verified record.
    pub fn verified(mention: &Mention, status: VerifiedStatus, at: DateTime<Utc>) -> Self {
        let mut notification = Notification {
            source: mention.source.clone(),
            target: mention.target.clone(),
            validated: true,
            mentioned: None,
            deleted: None,
            validated_at: at,
        };
        notification.apply(status, at);
        notification
    }

    /// Overwrites the verification result in place.
    ///
    /// Clears whichever flag the new status does not carry, so a page that
    /// was mentioned and later gone ends up with only `deleted`.
    pub fn apply(&mut self, status: VerifiedStatus, at: DateTime<Utc>) {
        match status {
            VerifiedStatus::Mentioned(found) => {
                self.mentioned = Some(found);
                self.deleted = None;
            }
            VerifiedStatus::Deleted => {
                self.mentioned = None;
                self.deleted = Some(true);
            }
        }
        self.validated = true;
        self.validated_at = at;
    }

    /// Returns the recorded status, if the record carries one.
    pub fn status(&self) -> Option<VerifiedStatus> {
        if self.deleted == Some(true) {
            Some(VerifiedStatus::Deleted)
        } else {
            self.mentioned.map(VerifiedStatus::Mentioned)
        }
    }

    /// Returns true if this record is for the given pair.
    pub fn is_for(&self, mention: &Mention) -> bool {
        mention.is_pair(&self.source, &self.target)
    }

    /// Returns true if the record was verified less than `window` before `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.validated_at < window
    }
}
