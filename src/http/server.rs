//! HTTP server setup and the gateway handler.
//!
//! # Responsibilities
//! - Create Axum Router with system endpoints and the catch-all gateway route
//! - Wire up middleware (tracing, body limit)
//! - Bind server to listener with graceful shutdown
//! - Per request: track in-flight count, resolve request ID, route, invoke,
//!   write the response, record the hit

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{HeaderName, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::error::GatewayResult;
use crate::http::request::{client_addr, parse_request, resolve_request_id};
use crate::http::response::write_response;
use crate::http::system;
use crate::invocation::InvocationClient;
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;
use crate::stats::{ActiveRequests, InvocationRecord, StatsRecorder};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: InvocationClient,
    /// Present when stats recording is enabled.
    pub recorder: Option<StatsRecorder>,
    pub active: ActiveRequests,
    pub request_id_header: Option<HeaderName>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/system/status", any(system::get_status))
            .route("/system/stats", any(system::get_stats))
            .route("/system/metrics", any(system::get_metrics))
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
    }

    /// Router with state applied, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: proxies `/{target}/{path...}` to the target function.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let _active = state.active.track().await;

    let request_id = resolve_request_id(request.headers(), state.request_id_header.as_ref());
    let span = tracing::info_span!("request", request_id = %request_id);

    proxy(&state, request, start_time).instrument(span).await
}

async fn proxy(state: &AppState, request: Request<Body>, start_time: Instant) -> Response {
    let client = client_addr(&request);
    tracing::debug!(
        method = %request.method(),
        uri = %request.uri(),
        client = %client,
        "Received request"
    );

    match forward(state, request).await {
        Ok((target, response)) => {
            let elapsed = start_time.elapsed();
            let status = response.status();
            tracing::info!(
                target_name = %target,
                status = status.as_u16(),
                client = %client,
                elapsed = ?elapsed,
                "Proxied request"
            );
            metrics::record_request(status.as_u16(), start_time);

            if let Some(recorder) = &state.recorder {
                if let Err(e) = recorder.record_hit(InvocationRecord::new(target, elapsed)).await {
                    tracing::warn!(error = %e, "Failed to record hit");
                }
            }
            response
        }
        Err(e) => {
            tracing::error!(client = %client, error = %e, "Request failed");
            metrics::record_request(e.status_code().as_u16(), start_time);
            e.into_response()
        }
    }
}

/// Route, invoke and write. Returns the target name with the client response.
async fn forward(state: &AppState, request: Request<Body>) -> GatewayResult<(String, Response)> {
    let inbound = parse_request(request).await?;
    let target = inbound.route.target;

    let result = state
        .client
        .invoke(
            &target,
            &inbound.method,
            &inbound.route.path,
            inbound.headers,
            &inbound.body,
        )
        .await?;

    let body_bytes = result.body.len();
    let response = write_response(result)?;
    tracing::debug!(
        status = response.status().as_u16(),
        body_bytes,
        "Wrote response"
    );

    Ok((target, response))
}
