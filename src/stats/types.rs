//! Stats types and error definitions.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One completed request, handed to the recorder exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    /// Target function name.
    pub target: String,
    /// Wall time from request arrival to response written.
    pub duration: Duration,
}

impl InvocationRecord {
    pub fn new(target: impl Into<String>, duration: Duration) -> Self {
        Self {
            target: target.into(),
            duration,
        }
    }
}

/// Per-target counters.
///
/// `last_reported <= hits` always holds; the gap is the unreported delta.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterEntry {
    pub hits: u64,
    #[serde(rename = "lastReport")]
    pub last_reported: u64,
}

impl CounterEntry {
    /// Hits not yet acknowledged by the collector.
    pub fn due(&self) -> u64 {
        self.hits.saturating_sub(self.last_reported)
    }
}

/// Point-in-time copy of the counter table, ordered by target name.
pub type StatsSnapshot = BTreeMap<String, CounterEntry>;

/// Errors talking to a stats actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The consumer task is gone; no further events can be applied.
    #[error("stats channel closed")]
    Closed,
}

/// Errors pushing a delta to the collector.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("received status code: {0}")]
    Status(u16),

    #[error("stats recorder unavailable: {0}")]
    Recorder(#[from] StatsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_entry_json_shape() {
        let entry = CounterEntry { hits: 7, last_reported: 5 };
        assert_eq!(entry.due(), 2);
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            serde_json::json!({"hits": 7, "lastReport": 5})
        );
    }
}
