//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound URI ("/{target}/{sub-path}?{query}")
//!     → router.rs (split first segment off the path)
//!     → Return: Route { target, forwarded path } or InvalidRequest
//! ```
//!
//! # Design Decisions
//! - Stateless: no route table, the target is the first path segment
//! - No normalization: the sub-path is forwarded verbatim
//! - Query string travels with the forwarded path

pub mod router;

pub use router::{route, route_uri, Route};
