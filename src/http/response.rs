//! Response handling and transformation.
//!
//! # Responsibilities
//! - Turn a decoded function result into the client response
//! - Map unrepresentable results to a write error (500)
//!
//! # Design Decisions
//! - Headers are copied as-is, one value per name
//! - Status, header names and values are validated before anything is sent

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

use crate::error::{GatewayError, GatewayResult};
use crate::invocation::InvocationResponse;

/// Build the client response from a function result.
pub fn write_response(result: InvocationResponse) -> GatewayResult<Response> {
    let status = StatusCode::from_u16(result.status)
        .map_err(|e| GatewayError::ResponseWrite(format!("status {}: {}", result.status, e)))?;

    let mut response = Response::new(Body::from(result.body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    for (name, value) in result.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| GatewayError::ResponseWrite(format!("header name {:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(&value)
            .map_err(|e| GatewayError::ResponseWrite(format!("header {:?} value: {}", name, e)))?;
        headers.append(header_name, header_value);
    }

    Ok(response)
}
