//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, gateway handler)
//!     → request.rs (request ID, routing, header flattening, body)
//!     → invocation client (envelope round trip)
//!     → response.rs (status, headers, body back to the client)
//!     → stats recorder (hit, duration)
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod system;

pub use request::{resolve_request_id, InboundRequest};
pub use server::{AppState, HttpServer};
