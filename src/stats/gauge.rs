//! In-flight request gauge.
//!
//! Same single-writer discipline as the recorder: one consumer task owns the
//! count, everything else submits adjustments or asks for the current value.

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::observability::metrics;
use crate::stats::recorder::CHANNEL_CAPACITY;
use crate::stats::types::StatsError;

#[derive(Debug)]
enum GaugeEvent {
    Adjust(i64),
    Current(oneshot::Sender<i64>),
}

/// Handle to the active-request count.
#[derive(Clone, Debug)]
pub struct ActiveRequests {
    tx: mpsc::Sender<GaugeEvent>,
}

impl ActiveRequests {
    /// Spawn the consumer task and return a handle to it.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut active: i64 = 0;
            while let Some(event) = rx.recv().await {
                match event {
                    GaugeEvent::Adjust(delta) => {
                        active += delta;
                        metrics::set_active_requests(active);
                    }
                    GaugeEvent::Current(reply) => {
                        let _ = reply.send(active);
                    }
                }
            }
        });

        Self { tx }
    }

    /// Submit a change to the count.
    pub async fn adjust(&self, delta: i64) -> Result<(), StatsError> {
        self.tx
            .send(GaugeEvent::Adjust(delta))
            .await
            .map_err(|_| StatsError::Closed)
    }

    /// Count after all previously submitted adjustments are applied.
    pub async fn current(&self) -> Result<i64, StatsError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(GaugeEvent::Current(tx))
            .await
            .map_err(|_| StatsError::Closed)?;
        rx.await.map_err(|_| StatsError::Closed)
    }

    /// Count a request as active until the returned guard is dropped.
    pub async fn track(&self) -> ActiveRequestGuard {
        if self.adjust(1).await.is_err() {
            tracing::warn!("Active request gauge unavailable");
        }
        ActiveRequestGuard {
            tx: self.tx.clone(),
        }
    }
}

/// Decrements the gauge when dropped, on every exit path of a request.
#[derive(Debug)]
pub struct ActiveRequestGuard {
    tx: mpsc::Sender<GaugeEvent>,
}

impl Drop for ActiveRequestGuard {
    fn drop(&mut self) {
        match self.tx.try_send(GaugeEvent::Adjust(-1)) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(event)) => {
                // Drop cannot wait; finish the send on the runtime instead of losing it.
                let tx = self.tx.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => {
                        handle.spawn(async move {
                            let _ = tx.send(event).await;
                        });
                    }
                    Err(_) => tracing::warn!("Active request decrement lost: no runtime"),
                }
            }
        }
    }
}
