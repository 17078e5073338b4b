//! Main entry point for the data-catalog-downloader CLI

use clap::Parser;
use data_catalog_downloader::cli::{Cli, Commands};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    // Check if JSON output is requested via environment variable
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("data_catalog_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = data_catalog_downloader::metrics::init_metrics(addr).await {
            warn!("Metrics exporter disabled: {}", e);
        }
    }

    let result = match &cli.command {
        Commands::Download(args) => args.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Dates(args) => args.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::MapFiles(args) => args.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
