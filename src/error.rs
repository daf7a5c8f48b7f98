//! Gateway error taxonomy and its mapping onto HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors produced while proxying a single inbound request.
///
/// Every variant is handled inside the request task and translated into an
/// HTTP status; none of them terminate the process.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound request could not be mapped onto a target.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The outbound envelope could not be serialized.
    #[error("error marshalling request: {0}")]
    Marshal(#[source] serde_json::Error),

    /// The compute endpoint could not be reached or rejected the call.
    #[error("error calling {target}: {message}")]
    Invocation { target: String, message: String },

    /// The compute endpoint answered with a malformed result envelope.
    #[error("error unmarshalling response: {0}")]
    ResponseFormat(String),

    /// The decoded result could not be written back to the client.
    #[error("error writing response: {0}")]
    ResponseWrite(String),
}

impl GatewayError {
    /// HTTP status reported to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Marshal(_)
            | GatewayError::Invocation { .. }
            | GatewayError::ResponseFormat(_) => StatusCode::BAD_GATEWAY,
            GatewayError::ResponseWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        // Body stays empty; details go to the log with the request id.
        self.status_code().into_response()
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatewayError::InvalidRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::Invocation { target: "fn".into(), message: "down".into() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::ResponseFormat("status code 0".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            GatewayError::ResponseWrite("bad header".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_display() {
        let err = GatewayError::Invocation { target: "orders".into(), message: "timed out".into() };
        assert_eq!(err.to_string(), "error calling orders: timed out");
    }
}
