//! Lambda HTTP Gateway
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌────────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http server ─▶ routing ─▶ invocation client ─┼──▶ Function
//!                           │        │                     (envelope codec)   │    invoke API
//!     Client Response       │        ▼                                        │
//!     ◀─────────────────────┼── response ◀──────────────────────────────────┼───
//!                           │        │                                        │
//!                           │        ▼ hit                                    │
//!                           │   stats recorder ◀── snapshot ── stats reporter ┼──▶ Collector
//!                           │   (single writer)                  (timer)      │
//!                           └────────────────────────────────────────────────┘
//! ```
//!
//! Configuration comes from the environment (`PORT`, `AWS_REGION`,
//! `STATS_REPORT_URL`, ...), optionally on top of a TOML file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use lambda_http_gateway::config::loader;
use lambda_http_gateway::lifecycle::{signals, startup, Shutdown};
use lambda_http_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "lambda-http-gateway")]
#[command(about = "HTTP gateway in front of function invocations", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = loader::load(cli.config.as_deref()).context("failed to load configuration")?;

    logging::init_logging(&config.observability.log_level);
    metrics::init_metrics().context("failed to install Prometheus recorder")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        region = %config.invocation.region,
        port = config.listener.port,
        "lambda-http-gateway starting"
    );

    let listener = startup::bind(&config).await?;

    let shutdown = Arc::new(Shutdown::new());
    signals::spawn_signal_listener(shutdown.clone());

    startup::serve(&config, listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
