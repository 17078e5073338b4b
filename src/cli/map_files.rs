//! Map files command: load the newest bundle and look up a ticker

use chrono::{Local, NaiveDate};
use clap::Args;

use super::{catalog_client, parse_date, Cli, CliError, OutputFormat, TerminalProgress};
use crate::downloader::DownloadExecutor;
use crate::mapfile::{MapFile, MapFileCache, MapFileSet};
use std::sync::Arc;

/// Map files command arguments
#[derive(Args, Debug)]
pub struct MapFilesArgs {
    /// Ticker to look up
    #[arg(long)]
    pub ticker: Option<String>,

    /// Date the ticker was in force (YYYY-MM-DD or YYYYMMDD, default today)
    #[arg(long, value_parser = parse_date, requires = "ticker")]
    pub date: Option<NaiveDate>,
}

impl MapFilesArgs {
    /// Execute the map-files command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let settings = cli.settings()?;
        let organization_id = settings.require_organization()?.to_string();

        let client = catalog_client(&settings)?;
        let progress = Arc::new(TerminalProgress::new());
        let executor =
            DownloadExecutor::new(client, settings.data_dir.clone()).with_observer(progress.clone());

        let cache = MapFileCache::new();
        let map_files = cache.get_map_files(&executor, &organization_id).await;
        progress.finish();
        let map_files = map_files?;

        let Some(ticker) = &self.ticker else {
            match cli.output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "map_files": map_files.len() }))
                }
                OutputFormat::Human => println!("Loaded {} map files", map_files.len()),
            }
            return Ok(());
        };

        let date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let map_file = map_files.find_by_ticker(ticker, date).ok_or_else(|| {
            CliError::InvalidArgument(format!("no map file has {ticker} in force on {date}"))
        })?;

        print_lookup(cli.output_format, map_file, ticker, date);
        Ok(())
    }
}

fn print_lookup(format: OutputFormat, map_file: &MapFile, ticker: &str, date: NaiveDate) {
    let renames = map_file.renames();

    match format {
        OutputFormat::Json => {
            let renames: Vec<_> = renames
                .iter()
                .map(|rename| {
                    serde_json::json!({
                        "effective_date": rename.effective_date,
                        "old_ticker": rename.old_ticker,
                        "new_ticker": rename.new_ticker,
                    })
                })
                .collect();
            let output = serde_json::json!({
                "ticker": ticker,
                "date": date,
                "map_file": map_file.name(),
                "permtick": map_file.permtick(),
                "current_ticker": map_file.current_ticker(),
                "first_date": map_file.first_date(),
                "last_date": map_file.last_date(),
                "renames": renames,
            });
            println!("{output}");
        }
        OutputFormat::Human => {
            println!("Map file: {}", map_file.name());
            println!("Permtick: {}", map_file.permtick().unwrap_or("-"));
            println!("Current ticker: {}", map_file.current_ticker().unwrap_or("-"));
            if let (Some(first), Some(last)) = (map_file.first_date(), map_file.last_date()) {
                println!("History: {first} to {last}");
            }
            for rename in &renames {
                println!(
                    "  {}: {} -> {}",
                    rename.effective_date, rename.old_ticker, rename.new_ticker
                );
            }
        }
    }
}
