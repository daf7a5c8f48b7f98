//! Gateway self-service endpoints under `/system`.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::server::AppState;
use crate::observability::metrics;

/// `/system/status`, any method.
pub async fn get_status() -> &'static str {
    "ok\n"
}

/// `/system/stats`: per-target hits and last reported mark.
pub async fn get_stats(State(state): State<AppState>) -> Response {
    let Some(recorder) = &state.recorder else {
        return (StatusCode::NOT_FOUND, "stats recording is disabled").into_response();
    };

    match recorder.snapshot().await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to snapshot stats");
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

/// `/system/metrics`: Prometheus text exposition.
pub async fn get_metrics() -> Response {
    match metrics::render() {
        Some(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics are disabled").into_response(),
    }
}
