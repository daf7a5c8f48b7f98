//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → stats tasks → invocation client → bind listener → serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop reporter → stop accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a bind or config error is fatal
//! - The reporter is running before the server accepts its first connection

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
