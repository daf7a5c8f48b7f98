//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the stats tasks the configuration asks for
//! - Build the invocation client and application state
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The reporter and server share one shutdown coordinator

use std::sync::Arc;

use axum::http::HeaderName;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::{AppState, HttpServer};
use crate::invocation::{InvocationClient, LambdaTransport};
use crate::lifecycle::Shutdown;
use crate::stats::{ActiveRequests, HttpHitSink, StatsRecorder, StatsReporter};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid request id header {0:?}")]
    RequestIdHeader(String),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Handler state plus the reporter to spawn, if reporting is enabled.
pub fn build_state(config: &GatewayConfig) -> Result<(AppState, Option<StatsReporter>), StartupError> {
    let transport = LambdaTransport::new(&config.invocation)?;

    let recorder = if config.stats.recorder_enabled() {
        Some(StatsRecorder::spawn())
    } else {
        tracing::debug!("Stats recording is disabled");
        None
    };

    let reporter = match (&recorder, config.stats.report_url.as_deref()) {
        (Some(recorder), Some(url)) if config.stats.reporter_enabled() => {
            tracing::debug!(url = %url, "Enabling stats reporter");
            Some(StatsReporter::new(
                recorder.clone(),
                Arc::new(HttpHitSink::new(url)),
                config.stats.report_interval,
            ))
        }
        _ => {
            tracing::debug!("Stats reporting is disabled");
            None
        }
    };

    let request_id_header = match config.listener.request_id_header.as_deref() {
        Some(name) if !name.is_empty() => Some(
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| StartupError::RequestIdHeader(name.to_string()))?,
        ),
        _ => None,
    };

    let state = AppState {
        client: InvocationClient::new(Arc::new(transport)),
        recorder,
        active: ActiveRequests::spawn(),
        request_id_header,
    };

    Ok((state, reporter))
}

/// Bind the configured listener address.
pub async fn bind(config: &GatewayConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

/// Start background tasks and serve on `listener` until `shutdown` triggers.
pub async fn serve(
    config: &GatewayConfig,
    listener: TcpListener,
    shutdown: &Shutdown,
) -> Result<(), StartupError> {
    let (state, reporter) = build_state(config)?;

    if let Some(reporter) = reporter {
        tokio::spawn(reporter.run(shutdown.subscribe()));
    }

    tracing::info!(
        region = %config.invocation.region,
        endpoint = %config.invocation.resolved_endpoint(),
        address = %listener.local_addr()?,
        "Starting lambda HTTP gateway"
    );

    HttpServer::new(state).run(listener, shutdown.subscribe()).await?;
    Ok(())
}
