//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port, interval)
//! - Check that URLs are usable http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("invocation region must not be empty")]
    EmptyRegion,

    #[error("{field} is not a valid http(s) URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("stats report interval must be non-zero")]
    ZeroInterval,

    #[error("request id header name is invalid: {0}")]
    InvalidHeaderName(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if let Some(name) = config.listener.request_id_header.as_deref() {
        if !name.is_empty() && axum::http::HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidHeaderName(name.to_string()));
        }
    }

    if config.invocation.region.is_empty() {
        errors.push(ValidationError::EmptyRegion);
    }

    let endpoint = config.invocation.resolved_endpoint();
    if !is_http_url(&endpoint) {
        errors.push(ValidationError::InvalidUrl {
            field: "invocation.endpoint",
            value: endpoint,
        });
    }

    if config.stats.reporter_enabled() {
        let url = config.stats.report_url.clone().unwrap_or_default();
        if !is_http_url(&url) {
            errors.push(ValidationError::InvalidUrl {
                field: "stats.report_url",
                value: url,
            });
        }
        if config.stats.report_interval.is_zero() {
            errors.push(ValidationError::ZeroInterval);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}
