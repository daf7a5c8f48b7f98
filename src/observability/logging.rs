//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Map the configured log level onto an env filter
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the configured level when set
//! - Unknown levels fall back to debug

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LEVEL: &str = "debug";

/// Normalize a configured level name to one tracing understands.
pub fn normalize_level(level: &str) -> &'static str {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" | "fatal" | "panic" => "error",
        _ => DEFAULT_LEVEL,
    }
}

/// Env filter directives for the gateway at `level`.
pub fn filter_directives(level: &str) -> String {
    let level = normalize_level(level);
    format!("lambda_http_gateway={level},tower_http={level}")
}

/// Install the global subscriber. Safe to call once per process.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    if let Err(e) = result {
        eprintln!("tracing subscriber already installed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(normalize_level("INFO"), "info");
        assert_eq!(normalize_level("warning"), "warn");
        assert_eq!(normalize_level("fatal"), "error");
        assert_eq!(normalize_level("chatty"), "debug");
        assert_eq!(
            filter_directives("info"),
            "lambda_http_gateway=info,tower_http=info"
        );
    }
}
