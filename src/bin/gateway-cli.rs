use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the Lambda HTTP Gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8090")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Status,
    /// Show per-function hits and last reported counts
    Stats,
    /// Dump Prometheus metrics
    Metrics,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/system/status", base)).send().await?;
            print_text(res).await?;
        }
        Commands::Stats => {
            let res = client.get(format!("{}/system/stats", base)).send().await?;
            print_json(res).await?;
        }
        Commands::Metrics => {
            let res = client.get(format!("{}/system/metrics", base)).send().await?;
            print_text(res).await?;
        }
    }

    Ok(())
}

/// Fail with the gateway's status and body unless the response is a success.
async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("gateway returned status {}: {}", status, text.trim_end()).into());
    }
    Ok(res)
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let res = check_status(res).await?;
    print!("{}", res.text().await?);
    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let res = check_status(res).await?;
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
