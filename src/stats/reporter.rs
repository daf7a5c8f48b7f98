//! Periodic delta reporting to the stats collector.
//!
//! # Responsibilities
//! - Snapshot the counter table on every tick
//! - Push each target's unreported delta to the collector
//! - Advance the reported mark only after the collector accepted the delta
//!
//! # Design Decisions
//! - `hits` is captured once per target at snapshot time; the mark advances to
//!   that captured value, so hits counted during the call stay due
//! - A failed push leaves the mark alone and the next tick resends the larger
//!   delta; there is no other retry and no backoff
//! - Shutdown stops the ticking, it does not abort a tick already running

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::observability::metrics;
use crate::stats::recorder::StatsRecorder;
use crate::stats::types::ReportError;

/// Destination for per-target hit deltas.
#[async_trait]
pub trait HitSink: Send + Sync {
    /// Deliver `amount` new hits for `target`.
    async fn send_hits(&self, target: &str, amount: u64) -> Result<(), ReportError>;
}

/// Collector client: `PUT {base}/hits/{target}` with the decimal delta as body.
#[derive(Clone)]
pub struct HttpHitSink {
    client: reqwest::Client,
    base_url: String,
}

impl HttpHitSink {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn hits_url(&self, target: &str) -> String {
        format!("{}/hits/{}", self.base_url, target)
    }
}

#[async_trait]
impl HitSink for HttpHitSink {
    async fn send_hits(&self, target: &str, amount: u64) -> Result<(), ReportError> {
        let response = self
            .client
            .put(self.hits_url(target))
            .body(amount.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReportError::Status(status.as_u16()));
        }

        tracing::trace!(target_name = %target, status = %status, "Reported stats");
        Ok(())
    }
}

/// Timer-driven reporter task.
pub struct StatsReporter {
    recorder: StatsRecorder,
    sink: Arc<dyn HitSink>,
    interval: Duration,
}

impl StatsReporter {
    pub fn new(recorder: StatsRecorder, sink: Arc<dyn HitSink>, interval: Duration) -> Self {
        Self {
            recorder,
            sink,
            interval,
        }
    }

    /// Tick until a shutdown signal arrives (or the coordinator is dropped).
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval = ?self.interval, "Stats reporter starting");

        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.report_pending().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Stats reporter received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one report cycle. Returns the number of targets successfully reported.
    pub async fn report_pending(&self) -> usize {
        tracing::trace!("Checking for pending stats");

        let snapshot = match self.recorder.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to snapshot stats");
                return 0;
            }
        };

        let pending: Vec<_> = snapshot
            .into_iter()
            .filter(|(_, entry)| entry.hits > entry.last_reported)
            .collect();
        if pending.is_empty() {
            tracing::trace!("No pending stats to report");
            return 0;
        }

        tracing::debug!(pending = pending.len(), "Reporting pending stats");
        let mut reported = 0;
        for (target, entry) in &pending {
            let hits = entry.hits;
            let due = entry.due();

            match self.report(target, hits, due).await {
                Ok(()) => {
                    reported += 1;
                    metrics::record_report(true);
                }
                Err(e) => {
                    metrics::record_report(false);
                    tracing::warn!(target_name = %target, due, error = %e, "Failed to report stats");
                }
            }
        }

        tracing::debug!(pending = pending.len(), reported, "Reported pending stats");
        reported
    }

    async fn report(&self, target: &str, hits: u64, due: u64) -> Result<(), ReportError> {
        self.sink.send_hits(target, due).await?;
        self.recorder.mark_reported(target, hits).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::Shutdown;
    use crate::stats::types::InvocationRecord;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Sink that records deliveries, can be told to fail, and can count
    /// extra hits while a delivery is in flight.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, u64)>>,
        failing: AtomicBool,
        during_send: Mutex<Option<(StatsRecorder, u64)>>,
    }

    #[async_trait]
    impl HitSink for RecordingSink {
        async fn send_hits(&self, target: &str, amount: u64) -> Result<(), ReportError> {
            let extra = self.during_send.lock().unwrap().take();
            if let Some((recorder, count)) = extra {
                for _ in 0..count {
                    recorder.record_hit(hit(target)).await?;
                }
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(ReportError::Status(503));
            }
            self.sent.lock().unwrap().push((target.to_string(), amount));
            Ok(())
        }
    }

    fn hit(target: &str) -> InvocationRecord {
        InvocationRecord::new(target, Duration::from_millis(1))
    }

    async fn record(recorder: &StatsRecorder, target: &str, count: u64) {
        for _ in 0..count {
            recorder.record_hit(hit(target)).await.unwrap();
        }
    }

    fn reporter(recorder: &StatsRecorder, sink: &Arc<RecordingSink>) -> StatsReporter {
        StatsReporter::new(recorder.clone(), sink.clone(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_reports_each_due_target_once() {
        let recorder = StatsRecorder::spawn();
        let sink = Arc::new(RecordingSink::default());
        record(&recorder, "orders", 3).await;
        record(&recorder, "users", 1).await;

        assert_eq!(reporter(&recorder, &sink).report_pending().await, 2);

        let mut sent = sink.sent.lock().unwrap().clone();
        sent.sort();
        assert_eq!(sent, vec![("orders".to_string(), 3), ("users".to_string(), 1)]);

        let snapshot = recorder.snapshot().await.unwrap();
        assert_eq!(snapshot["orders"].last_reported, 3);
        assert_eq!(snapshot["users"].last_reported, 1);

        // Nothing new, nothing sent.
        assert_eq!(reporter(&recorder, &sink).report_pending().await, 0);
        assert_eq!(sink.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_hits_during_report_stay_due() {
        let recorder = StatsRecorder::spawn();
        let sink = Arc::new(RecordingSink::default());
        record(&recorder, "orders", 4).await;
        *sink.during_send.lock().unwrap() = Some((recorder.clone(), 2));

        reporter(&recorder, &sink).report_pending().await;

        let entry = recorder.snapshot().await.unwrap()["orders"];
        assert_eq!(entry.hits, 6);
        assert_eq!(entry.last_reported, 4);
        assert_eq!(entry.due(), 2);

        reporter(&recorder, &sink).report_pending().await;
        assert_eq!(sink.sent.lock().unwrap().last(), Some(&("orders".to_string(), 2)));
    }

    #[tokio::test]
    async fn test_failed_report_is_retried_with_accrued_hits() {
        let recorder = StatsRecorder::spawn();
        let sink = Arc::new(RecordingSink::default());
        record(&recorder, "orders", 3).await;

        sink.failing.store(true, Ordering::SeqCst);
        assert_eq!(reporter(&recorder, &sink).report_pending().await, 0);
        assert_eq!(recorder.snapshot().await.unwrap()["orders"].last_reported, 0);

        record(&recorder, "orders", 2).await;
        sink.failing.store(false, Ordering::SeqCst);
        assert_eq!(reporter(&recorder, &sink).report_pending().await, 1);

        assert_eq!(*sink.sent.lock().unwrap(), vec![("orders".to_string(), 5)]);
        assert_eq!(recorder.snapshot().await.unwrap()["orders"].last_reported, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_shutdown() {
        let recorder = StatsRecorder::spawn();
        let sink = Arc::new(RecordingSink::default());
        let shutdown = Shutdown::new();
        record(&recorder, "orders", 1).await;

        let task = tokio::spawn(reporter(&recorder, &sink).run(shutdown.subscribe()));

        time::sleep(Duration::from_secs(6)).await;
        assert_eq!(sink.sent.lock().unwrap().len(), 1);

        record(&recorder, "orders", 1).await;
        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sink.sent.lock().unwrap().len(), 2);

        shutdown.trigger();
        task.await.unwrap();
    }

    #[test]
    fn test_hits_url() {
        let sink = HttpHitSink::new("http://collector:8080/");
        assert_eq!(sink.hits_url("orders"), "http://collector:8080/hits/orders");
    }
}
