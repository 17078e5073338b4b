//! # Data Catalog Downloader Library
//!
//! Resolves which files of a remote, priced market data catalog satisfy a data
//! request and mirrors exactly those files into a local data directory.
//!
//! ## Features
//!
//! - **Catalog Resolution**: Prefix listings plus date-capturing path patterns
//!   turn a [`ProductSpecification`] into an ordered list of [`RemoteFileDescriptor`]s
//! - **Billing-Aware Downloads**: Existing files are only replaced after an
//!   explicit permission or a single per-run confirmation; missing catalog
//!   files are skipped without charge
//! - **Map File Cache**: The ticker-rename bundle is fetched and parsed at most
//!   once per process
//! - **Data-Driven Grammars**: Path layouts per security type live in an embedded
//!   product table rather than in code
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use data_catalog_downloader::catalog::{CatalogResolver, WeekdayCalendar};
//! use data_catalog_downloader::downloader::{DownloadExecutor, OverwriteState};
//! use data_catalog_downloader::fetcher::http::HttpCatalogClient;
//! use data_catalog_downloader::{DataType, OptionStyle, ProductSpecification, Resolution, SecurityType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpCatalogClient::with_default_client("https://www.quantconnect.com/api/v2")?);
//! let resolver = CatalogResolver::with_embedded_registry(client.clone(), Arc::new(WeekdayCalendar::new()))?;
//!
//! let spec = ProductSpecification::new(
//!     SecurityType::EquityOption,
//!     DataType::Trade,
//!     "USA",
//!     "AAPL",
//!     Resolution::Minute,
//! )
//! .with_option_style(OptionStyle::American)
//! .with_date_range(
//!     NaiveDate::from_ymd_opt(2021, 1, 4),
//!     NaiveDate::from_ymd_opt(2021, 1, 8),
//! );
//!
//! let files = resolver.build_file_list(&spec, Decimal::ONE).await?;
//! let executor = DownloadExecutor::new(client, "./data");
//! executor
//!     .download_all(&files, false, &OverwriteState::new(), "organization-id")
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`registry`] - Embedded table of path grammars per security type and data type
//! - [`catalog`] - Path pattern matching, existence probes and date range resolution
//! - [`fetcher`] - Catalog transport (listing and file retrieval) and archive reading
//! - [`downloader`] - Download orchestration, overwrite policy and progress reporting
//! - [`mapfile`] - Ticker-rename map files and their process-lifetime cache
//! - [`output`] - Local mirror path mapping and atomic writes
//! - [`metrics`] - Counters for listings, downloads and skips

#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Catalog resolution
pub mod catalog;

/// CLI command implementations
pub mod cli;

/// Download orchestration
pub mod downloader;

/// Catalog transport and archive access
pub mod fetcher;

/// Ticker-rename map files
pub mod mapfile;

/// Observability counters
pub mod metrics;

/// Local mirror output
pub mod output;

/// Product path grammar registry
pub mod registry;

/// Date format used in every catalog path (`20210104`)
pub const CATALOG_DATE_FORMAT: &str = "%Y%m%d";

/// Security type of a data product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityType {
    /// US equities
    Equity,
    /// Options on equities
    EquityOption,
    /// Options on indices
    IndexOption,
    /// Futures contracts
    Future,
}

impl std::fmt::Display for SecurityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SecurityType::Equity => "equity",
            SecurityType::EquityOption => "equity-option",
            SecurityType::IndexOption => "index-option",
            SecurityType::Future => "future",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SecurityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equity" => Ok(SecurityType::Equity),
            "equity-option" | "equityoption" | "option" => Ok(SecurityType::EquityOption),
            "index-option" | "indexoption" => Ok(SecurityType::IndexOption),
            "future" => Ok(SecurityType::Future),
            _ => Err(format!("Invalid security type: {s}")),
        }
    }
}

/// Kind of data requested for a product
///
/// [`DataType::Chains`] is a sentinel: chain files are stored per date instead
/// of per ticker, which changes how the catalog is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    /// Trade bars
    Trade,
    /// Quote bars
    Quote,
    /// Open interest
    OpenInterest,
    /// Per-date option chain listings
    Chains,
}

impl DataType {
    /// Name used inside catalog file names (`20210104_openinterest_american.zip`)
    pub fn path_name(&self) -> &'static str {
        match self {
            DataType::Trade => "trade",
            DataType::Quote => "quote",
            DataType::OpenInterest => "openinterest",
            DataType::Chains => "chains",
        }
    }

    /// Whether this is the chains sentinel
    pub fn is_chains(&self) -> bool {
        matches!(self, DataType::Chains)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DataType::Trade => "trade",
            DataType::Quote => "quote",
            DataType::OpenInterest => "open-interest",
            DataType::Chains => "chains",
        };
        write!(f, "{s}")
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trade" => Ok(DataType::Trade),
            "quote" => Ok(DataType::Quote),
            "open-interest" | "openinterest" => Ok(DataType::OpenInterest),
            "chains" => Ok(DataType::Chains),
            _ => Err(format!("Invalid data type: {s}")),
        }
    }
}

/// Bar resolution of a data product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// Tick data
    Tick,
    /// Second bars
    Second,
    /// Minute bars
    Minute,
    /// Hour bars
    Hour,
    /// Daily bars
    Daily,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Resolution::Tick => "tick",
            Resolution::Second => "second",
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
            Resolution::Daily => "daily",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tick" => Ok(Resolution::Tick),
            "second" => Ok(Resolution::Second),
            "minute" => Ok(Resolution::Minute),
            "hour" => Ok(Resolution::Hour),
            "daily" => Ok(Resolution::Daily),
            _ => Err(format!("Invalid resolution: {s}")),
        }
    }
}

/// Option exercise style, the sub-type discriminator of option products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionStyle {
    /// Exercisable any time before expiry
    American,
    /// Exercisable at expiry only
    European,
}

impl std::fmt::Display for OptionStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OptionStyle::American => "american",
            OptionStyle::European => "european",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OptionStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "american" => Ok(OptionStyle::American),
            "european" => Ok(OptionStyle::European),
            _ => Err(format!("Invalid option style: {s}")),
        }
    }
}

/// A downloadable catalog file and its price
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteFileDescriptor {
    /// Path relative to the data root, reused verbatim as the local relative path
    pub path: String,
    /// Cost of the file in catalog credits (may be zero)
    pub price: Decimal,
}

impl RemoteFileDescriptor {
    /// Create a descriptor for a priced file
    pub fn new(path: impl Into<String>, price: Decimal) -> Self {
        Self {
            path: path.into(),
            price,
        }
    }

    /// Create a descriptor for a free file
    pub fn free(path: impl Into<String>) -> Self {
        Self::new(path, Decimal::ZERO)
    }
}

/// Fully resolved description of a data request
///
/// Built once through the `with_*` methods and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecification {
    security_type: SecurityType,
    data_type: DataType,
    market: String,
    ticker: String,
    resolution: Resolution,
    option_style: Option<OptionStyle>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl ProductSpecification {
    /// Create a specification without sub-type or date bounds
    pub fn new(
        security_type: SecurityType,
        data_type: DataType,
        market: impl Into<String>,
        ticker: impl Into<String>,
        resolution: Resolution,
    ) -> Self {
        Self {
            security_type,
            data_type,
            market: market.into(),
            ticker: ticker.into(),
            resolution,
            option_style: None,
            start_date: None,
            end_date: None,
        }
    }

    /// Set the option style sub-type
    pub fn with_option_style(mut self, option_style: OptionStyle) -> Self {
        self.option_style = Some(option_style);
        self
    }

    /// Set the (inclusive) date bounds; `None` leaves that side unbounded
    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Security type
    pub fn security_type(&self) -> SecurityType {
        self.security_type
    }

    /// Data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Market (e.g. "USA")
    pub fn market(&self) -> &str {
        &self.market
    }

    /// Ticker as entered
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Resolution
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Option style, if any
    pub fn option_style(&self) -> Option<OptionStyle> {
        self.option_style
    }

    /// Inclusive start bound
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Inclusive end bound
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Validate specification integrity
    pub fn validate(&self) -> Result<(), String> {
        if self.ticker.trim().is_empty() {
            return Err("Ticker cannot be empty".to_string());
        }

        if self.market.trim().is_empty() {
            return Err("Market cannot be empty".to_string());
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(format!(
                    "Start date ({start}) must not be after end date ({end})"
                ));
            }
        }

        if self.data_type.is_chains() && (self.start_date.is_none() || self.end_date.is_none()) {
            return Err("Chains requests need both a start and an end date".to_string());
        }

        Ok(())
    }
}
