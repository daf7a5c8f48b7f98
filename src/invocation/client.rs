//! Function invocation client.
//!
//! # Responsibilities
//! - Build and serialize the invocation envelope
//! - Perform exactly one call to the compute endpoint per request
//! - Classify failures (marshal, transport, response format)
//!
//! # Design Decisions
//! - The network hop sits behind `FunctionTransport` so the gateway can be
//!   exercised without a live endpoint
//! - No retries and no internal request timeout; the HTTP client only bounds
//!   connection establishment

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::InvocationConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::invocation::envelope::{decode_payload, encode_request, Headers, InvocationResponse};

/// Header set by the invoke API when the function itself failed.
pub const FUNCTION_ERROR_HEADER: &str = "x-amz-function-error";

/// Raw payload transport to the compute endpoint.
#[async_trait]
pub trait FunctionTransport: Send + Sync {
    /// Invoke `target` synchronously with a serialized envelope and return the raw result payload.
    ///
    /// Any failure is reported as a message; callers surface all of them identically.
    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<Vec<u8>, String>;
}

/// Transport speaking the Lambda `Invoke` REST API over HTTP.
///
/// Requests are sent unsigned: point `endpoint` at a signing sidecar,
/// a local runtime emulator or any compatible invoke endpoint.
#[derive(Clone)]
pub struct LambdaTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl LambdaTransport {
    /// Create a transport from the invocation configuration.
    pub fn new(config: &InvocationConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.resolved_endpoint().trim_end_matches('/').to_string(),
        })
    }

    fn invoke_url(&self, target: &str) -> String {
        format!("{}/2015-03-31/functions/{}/invocations", self.endpoint, target)
    }
}

#[async_trait]
impl FunctionTransport for LambdaTransport {
    async fn invoke(&self, target: &str, payload: Vec<u8>) -> Result<Vec<u8>, String> {
        let response = self
            .client
            .post(self.invoke_url(target))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let function_error = response
            .headers()
            .get(FUNCTION_ERROR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(|e| e.to_string())?;

        if !status.is_success() {
            return Err(format!(
                "invoke API returned {}: {}",
                status,
                String::from_utf8_lossy(&body)
            ));
        }
        if let Some(kind) = function_error {
            return Err(format!(
                "function error ({}): {}",
                kind,
                String::from_utf8_lossy(&body)
            ));
        }

        Ok(body.to_vec())
    }
}

/// Drives a single request/response exchange with a target function.
#[derive(Clone)]
pub struct InvocationClient {
    transport: Arc<dyn FunctionTransport>,
}

impl InvocationClient {
    pub fn new(transport: Arc<dyn FunctionTransport>) -> Self {
        Self { transport }
    }

    /// Invoke `target` with an HTTP request and return the decoded result.
    pub async fn invoke(
        &self,
        target: &str,
        method: &str,
        path: &str,
        headers: Headers,
        body: &[u8],
    ) -> GatewayResult<InvocationResponse> {
        tracing::debug!(
            target_name = %target,
            method = %method,
            path = %path,
            body_bytes = body.len(),
            "Invoking function"
        );

        let envelope = encode_request(method, path, headers, body);
        let payload = serde_json::to_vec(&envelope).map_err(GatewayError::Marshal)?;

        let result = self
            .transport
            .invoke(target, payload)
            .await
            .map_err(|message| GatewayError::Invocation {
                target: target.to_string(),
                message,
            })?;

        let response = decode_payload(&result)?;

        tracing::debug!(
            target_name = %target,
            status = response.status,
            body_bytes = response.body.len(),
            "Received function response"
        );
        Ok(response)
    }
}
