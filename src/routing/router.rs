//! Target lookup from the request path.
//!
//! # Responsibilities
//! - Extract the target name from the first path segment
//! - Build the path forwarded to the target
//!
//! # Design Decisions
//! - Only a single leading separator is stripped
//! - Split happens on the first remaining separator only
//! - Explicit InvalidRequest rather than a default target

use axum::http::Uri;

use crate::error::{GatewayError, GatewayResult};

/// A resolved route: which target to invoke and with which path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Name of the compute function to invoke.
    pub target: String,
    /// Path handed to the function, always starting with `/`.
    pub path: String,
}

/// Split a raw URL path into target name and forwarded path.
pub fn route(path: &str) -> GatewayResult<Route> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (target, rest) = match trimmed.split_once('/') {
        Some((target, rest)) => (target, Some(rest)),
        None => (trimmed, None),
    };

    if target.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "path must include target name and request path".to_string(),
        ));
    }

    let path = match rest {
        Some(rest) => format!("/{}", rest),
        None => "/".to_string(),
    };

    Ok(Route {
        target: target.to_string(),
        path,
    })
}

/// Route a full request URI, carrying the query string over to the forwarded path.
pub fn route_uri(uri: &Uri) -> GatewayResult<Route> {
    let mut route = route(uri.path())?;
    if let Some(query) = uri.query() {
        route.path.push('?');
        route.path.push_str(query);
    }
    Ok(route)
}
