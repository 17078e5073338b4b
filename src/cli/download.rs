//! Download command implementation

use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use super::{catalog_client, parse_date, Cli, CliError, OutputFormat, TerminalProgress};
use crate::catalog::{CatalogResolver, WeekdayCalendar};
use crate::downloader::{DownloadExecutor, DownloadSummary, OverwriteState};
use crate::{DataType, OptionStyle, ProductSpecification, Resolution, SecurityType};

/// Parse a non-negative per-file price
fn parse_price(input: &str) -> Result<Decimal, String> {
    let price = Decimal::from_str(input.trim()).map_err(|e| format!("'{input}' is not a price: {e}"))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err("price must not be negative".to_string());
    }
    Ok(price)
}

/// Flags describing one data product
#[derive(Args, Debug, Clone)]
pub struct ProductArgs {
    /// Security type (equity, equity-option, index-option, future)
    #[arg(long)]
    pub security_type: SecurityType,

    /// Data type (trade, quote, open-interest, chains)
    #[arg(long)]
    pub data_type: DataType,

    /// Market (e.g. usa)
    #[arg(long, default_value = "usa")]
    pub market: String,

    /// Ticker (e.g. AAPL)
    #[arg(long)]
    pub ticker: String,

    /// Resolution (tick, second, minute, hour, daily)
    #[arg(long, default_value = "minute")]
    pub resolution: Resolution,

    /// Option style for option products (american, european)
    #[arg(long)]
    pub option_style: Option<OptionStyle>,

    /// First date, inclusive (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last date, inclusive (YYYY-MM-DD or YYYYMMDD)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,
}

impl ProductArgs {
    /// Build the product specification
    pub fn to_spec(&self) -> Result<ProductSpecification, CliError> {
        let mut spec = ProductSpecification::new(
            self.security_type,
            self.data_type,
            self.market.clone(),
            self.ticker.clone(),
            self.resolution,
        )
        .with_date_range(self.start, self.end);

        if let Some(style) = self.option_style {
            spec = spec.with_option_style(style);
        }

        spec.validate().map_err(CliError::InvalidArgument)?;
        Ok(spec)
    }
}

/// Download command arguments
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Product to download
    #[command(flatten)]
    pub product: ProductArgs,

    /// Price quoted per file, shown in progress lines
    #[arg(long, default_value = "0", value_parser = parse_price)]
    pub price: Decimal,
}

impl DownloadArgs {
    /// Execute the download command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let settings = cli.settings()?;
        let organization_id = settings.require_organization()?.to_string();
        let spec = self.product.to_spec()?;

        let client = catalog_client(&settings)?;
        let resolver =
            CatalogResolver::with_embedded_registry(client.clone(), Arc::new(WeekdayCalendar::new()))?;

        if !spec.data_type().is_chains() && !resolver.probe_exists(&spec).await? {
            return Err(CliError::InvalidArgument(format!(
                "{} has no {} {} data in the catalog",
                spec.ticker(),
                spec.resolution(),
                spec.data_type()
            )));
        }

        let files = resolver.build_file_list(&spec, self.price).await?;
        if files.is_empty() {
            info!(ticker = %spec.ticker(), "No catalog files match the requested range");
            print_summary(cli.output_format, &DownloadSummary::default(), 0);
            return Ok(());
        }

        let progress = Arc::new(TerminalProgress::new());
        let executor = DownloadExecutor::new(client, settings.data_dir.clone())
            .with_confirm(cli.confirm(&progress))
            .with_observer(progress.clone());

        let result = executor
            .download_all(&files, cli.overwrite, &OverwriteState::new(), &organization_id)
            .await;
        progress.finish();

        let summary = result?;
        print_summary(cli.output_format, &summary, files.len());
        Ok(())
    }
}

fn print_summary(format: OutputFormat, summary: &DownloadSummary, requested: usize) {
    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "requested": requested,
                "downloaded": summary.downloaded,
                "skipped_existing": summary.skipped_existing,
                "not_in_catalog": summary.not_in_catalog,
                "bytes": summary.bytes,
            });
            println!("{output}");
        }
        OutputFormat::Human => {
            println!("\nDownload completed");
            println!("Files requested: {requested}");
            println!("Files downloaded: {}", summary.downloaded);
            if summary.skipped_existing > 0 {
                println!("Existing files kept: {}", summary.skipped_existing);
            }
            if summary.not_in_catalog > 0 {
                println!("Missing from catalog: {}", summary.not_in_catalog);
            }
        }
    }
}
