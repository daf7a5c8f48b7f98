//! Request handling and transformation.
//!
//! # Responsibilities
//! - Resolve the request ID (caller-supplied header or UUID v4)
//! - Route the path to a target and forwarded path
//! - Flatten headers and buffer the body for the envelope
//!
//! # Design Decisions
//! - Request ID resolved as early as possible for tracing
//! - No body size limit here; the transport layer owns that decision
//! - Client identity is the peer socket address when known

use std::net::SocketAddr;

use axum::body::{to_bytes, Body, Bytes};
use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, HeaderName, Request};
use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult};
use crate::invocation::envelope::{flatten_headers, Headers};
use crate::routing::{route_uri, Route};

/// An inbound request reduced to what the function envelope needs.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: String,
    pub route: Route,
    pub headers: Headers,
    pub body: Bytes,
}

/// Use the configured header if present and non-empty, else a fresh UUID.
pub fn resolve_request_id(headers: &HeaderMap, header_name: Option<&HeaderName>) -> String {
    header_name
        .and_then(|name| headers.get(name))
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Peer address of the connection, as recorded by the server.
pub fn client_addr(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Route the request and buffer its body.
pub async fn parse_request(request: Request<Body>) -> GatewayResult<InboundRequest> {
    let route = route_uri(request.uri())?;
    let (parts, body) = request.into_parts();

    let body = to_bytes(body, usize::MAX)
        .await
        .map_err(|e| GatewayError::InvalidRequest(format!("error parsing request body: {}", e)))?;

    Ok(InboundRequest {
        method: parts.method.to_string(),
        route,
        headers: flatten_headers(&parts.headers),
        body,
    })
}
