//! CLI command implementations

pub mod dates;
pub mod download;
pub mod error;
pub mod map_files;
pub mod progress;

pub use dates::DatesArgs;
pub use download::{DownloadArgs, ProductArgs};
pub use error::CliError;
pub use map_files::MapFilesArgs;
pub use progress::TerminalProgress;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::downloader::config::DownloaderConfig;
use crate::downloader::{Confirm, FixedAnswer, TerminalConfirm};
use crate::fetcher::http::HttpCatalogClient;

/// Data Catalog Downloader CLI
#[derive(Parser, Debug)]
#[command(name = "data-catalog-downloader")]
#[command(about = "Mirror priced market data from a remote data catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// JSON config file (`data-folder`, `organization-id`, `api-url`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Local data directory (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Catalog API root (overrides the config file)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Organization billed for downloads (overrides the config file)
    #[arg(long, global = true)]
    pub organization: Option<String>,

    /// Overwrite existing files without asking
    #[arg(long, global = true, default_value_t = false)]
    pub overwrite: bool,

    /// Answer "yes" to the overwrite question without prompting
    #[arg(long, global = true, conflicts_with = "no")]
    pub yes: bool,

    /// Answer "no" to the overwrite question without prompting
    #[arg(long, global = true)]
    pub no: bool,

    /// Serve Prometheus metrics on this address (e.g. 127.0.0.1:9090)
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,

    /// Output format (json or human)
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a product and download its files
    Download(DownloadArgs),

    /// Print the dates the catalog offers for a product
    Dates(DatesArgs),

    /// Load the map file bundle and look up tickers
    MapFiles(MapFilesArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Effective settings after merging the config file with CLI flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Local data directory
    pub data_dir: PathBuf,
    /// Catalog API root
    pub api_url: String,
    /// Organization billed for downloads
    pub organization_id: Option<String>,
}

impl Settings {
    /// Organization id, required by every command that downloads
    pub fn require_organization(&self) -> Result<&str, CliError> {
        self.organization_id.as_deref().ok_or_else(|| {
            CliError::ConfigurationError(
                "no organization id, pass --organization or set organization-id in the config file"
                    .to_string(),
            )
        })
    }
}

impl Cli {
    /// Merge the config file (when given) with the CLI overrides
    pub fn settings(&self) -> Result<Settings, CliError> {
        let config = match &self.config {
            Some(path) => DownloaderConfig::load(path)?,
            None => DownloaderConfig::default(),
        };

        Ok(Settings {
            data_dir: self.data_dir.clone().unwrap_or_else(|| config.data_dir()),
            api_url: self
                .api_url
                .clone()
                .unwrap_or_else(|| config.api_url().to_string()),
            organization_id: self
                .organization
                .clone()
                .or_else(|| config.organization_id.clone()),
        })
    }

    /// Confirmation used on the first overwrite conflict
    ///
    /// Interactive prompts hide `progress` while waiting for the answer.
    pub fn confirm(&self, progress: &TerminalProgress) -> Arc<dyn Confirm> {
        if self.yes {
            Arc::new(FixedAnswer(true))
        } else if self.no {
            Arc::new(FixedAnswer(false))
        } else {
            Arc::new(TerminalConfirm::with_progress_bar(progress.bar().clone()))
        }
    }
}

/// Build the HTTP catalog client for the effective settings
pub(crate) fn catalog_client(settings: &Settings) -> Result<Arc<HttpCatalogClient>, CliError> {
    Ok(Arc::new(HttpCatalogClient::with_default_client(
        settings.api_url.clone(),
    )?))
}

/// Parse a date given as `YYYY-MM-DD` or `YYYYMMDD`
pub fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(input, crate::CATALOG_DATE_FORMAT))
        .map_err(|_| format!("'{input}' is not a date (expected YYYY-MM-DD or YYYYMMDD)"))
}
