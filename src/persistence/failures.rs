//! Per-source verification failure counts.
//!
//! Counts only ever go up. A source whose count passes the failure budget
//! stops being admitted, whatever target it claims.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use super::Result;
use super::atomic::{read_json_if_exists, write_json_atomic};

/// Failure counts keyed by source URL, backed by a flat JSON object.
#[derive(Debug)]
pub struct FailureCounter {
    path: PathBuf,
    counts: BTreeMap<String, u32>,
}

impl FailureCounter {
    /// Loads counts from `path`. A missing file yields no counts.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let counts = read_json_if_exists::<BTreeMap<String, u32>>(&path)?.unwrap_or_default();
        debug!(
            path = %path.display(),
            sources = counts.len(),
            "Loaded failure counts"
        );
        Ok(FailureCounter { path, counts })
    }

    /// Creates an empty counter that will persist to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        FailureCounter {
            path: path.into(),
            counts: BTreeMap::new(),
        }
    }

    /// Returns the failure count for `source` (zero if never failed).
    pub fn count(&self, source: &str) -> u32 {
        self.counts.get(source).copied().unwrap_or(0)
    }

    /// Increments the count for `source` and returns the new value.
    pub fn increment(&mut self, source: &str) -> u32 {
        let count = self.counts.entry(source.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Sets the count for `source` back to `previous`. Undoes an increment
    /// whose write failed.
    pub fn restore(&mut self, source: &str, previous: u32) {
        if previous == 0 {
            self.counts.remove(source);
        } else {
            self.counts.insert(source.to_string(), previous);
        }
    }

    /// Writes all counts to disk.
    pub fn persist(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.counts)
    }
}
