//! The (source, target) pair that identifies a link notification.
//!
//! Identity is the exact pair of strings as submitted. No URL normalization
//! happens here: `https://a.example/post` and `https://a.example/post/` are
//! different mentions, and the target string is matched verbatim against the
//! fetched source body.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A claim that `source` links to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mention {
    /// The page asserted to contain the link.
    pub source: String,

    /// The page asserted to be linked to.
    pub target: String,
}

impl Mention {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Mention {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Returns true if this mention refers to the given pair.
    pub fn is_pair(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }
}

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.target)
    }
}
