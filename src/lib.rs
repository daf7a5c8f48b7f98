//! Lambda HTTP Gateway Library
//!
//! Turns inbound HTTP requests into function invocations and tracks
//! per-function hit counts that are periodically pushed to a collector.

pub mod config;
pub mod error;
pub mod http;
pub mod invocation;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod stats;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
