//! Translation between raw HTTP and the function invocation envelope.
//!
//! # Wire format
//! ```text
//! request:  {"httpMethod", "path", "headers", "body" (base64), "isBase64Encoded": true}
//! response: {"statusCode", "headers", "body", "isBase64Encoded"}
//! ```
//!
//! # Design Decisions
//! - Request bodies are always base64, even when textual
//! - Headers are single-valued: the first value of each name wins
//! - Header names go out in canonical MIME case (`X-Req-Id`, `Content-Type`)
//! - A missing or zero status code is a protocol error, never an empty success

use std::collections::HashMap;

use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};

/// Single-valued header mapping exchanged with the function.
pub type Headers = HashMap<String, String>;

/// Envelope sent to the function for one proxied request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationEnvelope {
    pub http_method: String,
    pub path: String,
    pub headers: Headers,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Envelope returned by the function.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResult {
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub headers: Option<Headers>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

/// Decoded function result, ready to be written back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Flatten a multi-valued header map, keeping the first value per name.
///
/// Values that are not valid UTF-8 cannot be carried in the JSON envelope and are skipped.
pub fn flatten_headers(headers: &HeaderMap) -> Headers {
    headers
        .keys()
        .filter_map(|name| {
            let value = headers.get(name)?.to_str().ok()?;
            Some((canonical_header_name(name.as_str()), value.to_string()))
        })
        .collect()
}

/// Canonical MIME form of a header name: the first letter and every letter
/// following a hyphen are upper-cased, the rest lower-cased.
pub fn canonical_header_name(name: &str) -> String {
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Build the outbound envelope for a request.
pub fn encode_request(method: &str, path: &str, headers: Headers, body: &[u8]) -> InvocationEnvelope {
    InvocationEnvelope {
        http_method: method.to_string(),
        path: path.to_string(),
        headers,
        body: STANDARD.encode(body),
        is_base64_encoded: true,
    }
}

/// Decode a function result into status, headers and body bytes.
pub fn decode_result(result: InvocationResult) -> GatewayResult<InvocationResponse> {
    let status = match result.status_code {
        None | Some(0) => {
            return Err(GatewayError::ResponseFormat("missing status code".to_string()));
        }
        Some(code) => u16::try_from(code)
            .ok()
            .filter(|code| (100..=999).contains(code))
            .ok_or_else(|| GatewayError::ResponseFormat(format!("invalid status code {}", code)))?,
    };

    let body = result.body.unwrap_or_default();
    let body = if result.is_base64_encoded {
        STANDARD
            .decode(body.as_bytes())
            .map_err(|e| GatewayError::ResponseFormat(format!("error decoding body: {}", e)))?
    } else {
        body.into_bytes()
    };

    Ok(InvocationResponse {
        status,
        headers: result.headers.unwrap_or_default(),
        body,
    })
}

/// Parse a raw result payload and decode it.
pub fn decode_payload(payload: &[u8]) -> GatewayResult<InvocationResponse> {
    let result: InvocationResult = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::ResponseFormat(e.to_string()))?;
    decode_result(result)
}
