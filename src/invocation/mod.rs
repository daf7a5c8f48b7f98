//! Function invocation subsystem.
//!
//! # Data Flow
//! ```text
//! method, forwarded path, headers, body
//!     → envelope.rs (encode: base64 body, first-value headers)
//!     → client.rs (serialize, one call through FunctionTransport)
//!     → envelope.rs (decode: status check, optional base64 body)
//!     → InvocationResponse
//! ```

pub mod client;
pub mod envelope;

pub use client::{FunctionTransport, InvocationClient, LambdaTransport};
pub use envelope::{Headers, InvocationEnvelope, InvocationResponse, InvocationResult};
