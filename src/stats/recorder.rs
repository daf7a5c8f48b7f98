//! Single-writer counter table.
//!
//! # Responsibilities
//! - Own the per-target counter table for the process lifetime
//! - Apply hit and reported events in arrival order
//! - Serve snapshots to the reporter and the stats endpoint
//!
//! # Design Decisions
//! - One consumer task is the only code that mutates the table; producers
//!   only hold a channel sender, so no lock is needed
//! - Bounded queue: a full queue makes the producer wait, events are never dropped
//! - Snapshots travel through the same queue, so a snapshot reflects every
//!   event its caller submitted before asking

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use crate::observability::metrics;
use crate::stats::types::{CounterEntry, InvocationRecord, StatsError, StatsSnapshot};

/// Capacity of the recorder's event queue.
pub const CHANNEL_CAPACITY: usize = 100;

enum StatsEvent {
    Hit(InvocationRecord),
    Reported { target: String, hits: u64 },
    Snapshot(oneshot::Sender<StatsSnapshot>),
}

/// Handle to the counter table. Cheap to clone; all clones feed the same consumer.
#[derive(Clone, Debug)]
pub struct StatsRecorder {
    tx: mpsc::Sender<StatsEvent>,
}

impl StatsRecorder {
    /// Spawn the consumer task and return a handle to it.
    ///
    /// The task exits once every handle has been dropped.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut table = CounterTable::default();
            while let Some(event) = rx.recv().await {
                table.apply(event);
            }
            tracing::debug!("Stats recorder stopped");
        });

        tracing::debug!(capacity = CHANNEL_CAPACITY, "Stats recorder enabled");
        Self { tx }
    }

    /// Count one completed invocation.
    pub async fn record_hit(&self, record: InvocationRecord) -> Result<(), StatsError> {
        self.send(StatsEvent::Hit(record)).await
    }

    /// Acknowledge that the collector received all hits up to `hits` for `target`.
    pub async fn mark_reported(&self, target: &str, hits: u64) -> Result<(), StatsError> {
        self.send(StatsEvent::Reported {
            target: target.to_string(),
            hits,
        })
        .await
    }

    /// Copy of the table after all previously submitted events are applied.
    pub async fn snapshot(&self) -> Result<StatsSnapshot, StatsError> {
        let (tx, rx) = oneshot::channel();
        self.send(StatsEvent::Snapshot(tx)).await?;
        rx.await.map_err(|_| StatsError::Closed)
    }

    async fn send(&self, event: StatsEvent) -> Result<(), StatsError> {
        self.tx.send(event).await.map_err(|_| StatsError::Closed)
    }
}

#[derive(Default)]
struct CounterTable {
    entries: HashMap<String, CounterEntry>,
}

impl CounterTable {
    fn apply(&mut self, event: StatsEvent) {
        match event {
            StatsEvent::Hit(record) => {
                metrics::record_invocation(&record.target, record.duration);
                self.entries.entry(record.target).or_default().hits += 1;
            }
            StatsEvent::Reported { target, hits } => {
                if let Some(entry) = self.entries.get_mut(&target) {
                    // Never past hits, never backwards.
                    let hits = hits.min(entry.hits);
                    entry.last_reported = entry.last_reported.max(hits);
                }
            }
            StatsEvent::Snapshot(reply) => {
                let snapshot = self
                    .entries
                    .iter()
                    .map(|(target, entry)| (target.clone(), *entry))
                    .collect();
                let _ = reply.send(snapshot);
            }
        }
    }
}
