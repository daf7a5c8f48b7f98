//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (invocations, durations, in-flight requests)
//! - Expose Prometheus-compatible text for the `/system/metrics` endpoint
//!
//! # Metrics
//! - `functions_invoked_count` (counter): invocations per function
//! - `functions_duration_sum` (gauge, only ever increased): total invocation
//!   seconds per function
//! - `active_requests` (gauge): requests currently in flight
//! - `gateway_requests_total` (counter): responses by status code
//! - `gateway_request_duration_seconds` (histogram): end-to-end latency
//! - `stats_reports_total` (counter): collector pushes by result
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, which keeps tests free of global state
//! - The Prometheus handle is process-wide so handlers can render it directly

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder and describe all metrics.
pub fn init_metrics() -> Result<(), BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    if PROMETHEUS_HANDLE.set(handle).is_err() {
        tracing::warn!("Prometheus recorder already initialized");
    }

    metrics::describe_counter!(
        "functions_invoked_count",
        "Total number of invocations (per function)."
    );
    metrics::describe_gauge!(
        "functions_duration_sum",
        metrics::Unit::Seconds,
        "Total invocation duration in seconds (per function)."
    );
    metrics::describe_gauge!("active_requests", "Number of currently active requests.");
    metrics::describe_counter!(
        "gateway_requests_total",
        "Total number of proxied requests by response status."
    );
    metrics::describe_histogram!(
        "gateway_request_duration_seconds",
        metrics::Unit::Seconds,
        "End-to-end latency of proxied requests."
    );
    metrics::describe_counter!(
        "stats_reports_total",
        "Total number of stats pushes to the collector by result."
    );

    Ok(())
}

/// Prometheus text exposition, if the recorder is installed.
pub fn render() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(PrometheusHandle::render)
}

pub fn record_invocation(target: &str, duration: Duration) {
    metrics::counter!("functions_invoked_count", "function" => target.to_string()).increment(1);
    // Counters are integral; the float total rides on a gauge.
    metrics::gauge!("functions_duration_sum", "function" => target.to_string())
        .increment(duration.as_secs_f64());
}

pub fn set_active_requests(active: i64) {
    metrics::gauge!("active_requests").set(active as f64);
}

pub fn record_request(status: u16, start_time: Instant) {
    metrics::counter!("gateway_requests_total", "status" => status.to_string()).increment(1);
    metrics::histogram!("gateway_request_duration_seconds")
        .record(start_time.elapsed().as_secs_f64());
}

pub fn record_report(success: bool) {
    let result = if success { "success" } else { "failure" };
    metrics::counter!("stats_reports_total", "result" => result).increment(1);
}
