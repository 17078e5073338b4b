//! Dates command: print the dates a product resolves to

use clap::Args;
use std::sync::Arc;

use super::{catalog_client, Cli, CliError, OutputFormat, ProductArgs};
use crate::catalog::{CatalogResolver, WeekdayCalendar};

/// Dates command arguments
#[derive(Args, Debug)]
pub struct DatesArgs {
    /// Product to resolve
    #[command(flatten)]
    pub product: ProductArgs,
}

impl DatesArgs {
    /// Execute the dates command
    ///
    /// Nothing is downloaded and nothing is billed.
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let settings = cli.settings()?;
        let spec = self.product.to_spec()?;

        let client = catalog_client(&settings)?;
        let resolver =
            CatalogResolver::with_embedded_registry(client, Arc::new(WeekdayCalendar::new()))?;
        let dates = resolver.resolve_dates(&spec).await?;

        match cli.output_format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "security_type": spec.security_type(),
                    "data_type": spec.data_type(),
                    "ticker": spec.ticker(),
                    "dates": dates,
                });
                println!("{output}");
            }
            OutputFormat::Human => {
                for date in &dates {
                    println!("{date}");
                }
                println!("{} date(s)", dates.len());
            }
        }
        Ok(())
    }
}
