//! Ticker-rename map files
//!
//! A map file records the ticker history of one security. Each row is
//! `yyyymmdd,ticker[,exchange]` and means "`ticker` was in force up to and
//! including `yyyymmdd`". Rows are in date order; the first ticker is the
//! security's permanent identifier.
//!
//! ```text
//! 20040819,goog,Q
//! 20140402,goog,Q
//! 20501231,googl,Q
//! ```
//!
//! Map files ship as a single ZIP bundle in the catalog and are held in a
//! [`cache::MapFileCache`] for the lifetime of the process.

pub mod cache;

pub use cache::MapFileCache;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};

use crate::catalog::pattern::parse_catalog_date;

/// Map file errors
#[derive(Debug, thiserror::Error)]
pub enum MapFileError {
    /// A row could not be parsed
    #[error("invalid map file row {line}: {reason}")]
    InvalidRow {
        /// 1-based line number
        line: u64,
        /// What is wrong with the row
        reason: String,
    },

    /// An archive entry is not a valid map file
    #[error("invalid map file {entry}: {source}")]
    InvalidEntry {
        /// Entry name inside the bundle
        entry: String,
        /// Row error
        #[source]
        source: Box<MapFileError>,
    },

    /// The catalog lists no map file bundle
    #[error("no map file bundle found under {0}")]
    NoBundle(String),

    /// The bundle is still missing locally after the download attempt
    #[error("map file bundle {0} is not available locally")]
    BundleUnavailable(String),
}

/// One row of a map file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFileRow {
    /// Last date the ticker was in force
    pub date: NaiveDate,
    /// Ticker, lowercase
    pub ticker: String,
    /// Primary exchange code, when present
    pub exchange: Option<String>,
}

/// A ticker change derived from consecutive rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerRename {
    /// First date the new ticker is in force
    pub effective_date: NaiveDate,
    /// Ticker before the change
    pub old_ticker: String,
    /// Ticker after the change
    pub new_ticker: String,
}

/// Parsed ticker history of a single security
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapFile {
    name: String,
    rows: Vec<MapFileRow>,
}

impl MapFile {
    /// Parse map file text
    ///
    /// Blank lines are ignored. A row with a bad date, an empty ticker, or a
    /// date earlier than the previous row fails the whole file.
    pub fn parse(text: &str) -> Result<Self, MapFileError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let mut rows: Vec<MapFileRow> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| MapFileError::InvalidRow {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            if record.iter().all(str::is_empty) {
                continue;
            }

            let invalid = |reason: String| MapFileError::InvalidRow { line, reason };

            let date_field = record.get(0).unwrap_or_default();
            let date = parse_catalog_date(date_field).map_err(invalid)?;

            let ticker = record.get(1).unwrap_or_default();
            if ticker.is_empty() {
                return Err(invalid("missing ticker".to_string()));
            }

            if let Some(previous) = rows.last() {
                if date < previous.date {
                    return Err(invalid(format!(
                        "date {date} is earlier than the previous row ({})",
                        previous.date
                    )));
                }
            }

            let exchange = record
                .get(2)
                .filter(|exchange| !exchange.is_empty())
                .map(str::to_string);

            rows.push(MapFileRow {
                date,
                ticker: ticker.to_lowercase(),
                exchange,
            });
        }

        Ok(Self {
            name: String::new(),
            rows,
        })
    }

    /// Attach the bundle entry name this file was read from
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Bundle entry name (e.g. "goog.csv"), empty when parsed from bare text
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rows in date order
    pub fn rows(&self) -> &[MapFileRow] {
        &self.rows
    }

    /// Permanent identifier: the first ticker of the history
    pub fn permtick(&self) -> Option<&str> {
        self.rows.first().map(|row| row.ticker.as_str())
    }

    /// Most recent ticker
    pub fn current_ticker(&self) -> Option<&str> {
        self.rows.last().map(|row| row.ticker.as_str())
    }

    /// First date of the history
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|row| row.date)
    }

    /// Last date of the history
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    /// Ticker in force on `date`
    ///
    /// `None` before the first row and after the last one.
    pub fn ticker_at(&self, date: NaiveDate) -> Option<&str> {
        if date < self.first_date()? {
            return None;
        }

        // Rows are sorted, so the first row ending on or after `date` governs it
        let index = self.rows.partition_point(|row| row.date < date);
        self.rows.get(index).map(|row| row.ticker.as_str())
    }

    /// Ticker changes in chronological order
    pub fn renames(&self) -> Vec<TickerRename> {
        self.rows
            .windows(2)
            .filter(|pair| pair[0].ticker != pair[1].ticker)
            .filter_map(|pair| {
                Some(TickerRename {
                    effective_date: pair[0].date.succ_opt()?,
                    old_ticker: pair[0].ticker.clone(),
                    new_ticker: pair[1].ticker.clone(),
                })
            })
            .collect()
    }
}

/// Lookups across every map file of a bundle
pub trait MapFileSet {
    /// Map file whose ticker on `date` is `ticker` (case-insensitive)
    fn find_by_ticker(&self, ticker: &str, date: NaiveDate) -> Option<&MapFile>;
}

impl MapFileSet for [MapFile] {
    fn find_by_ticker(&self, ticker: &str, date: NaiveDate) -> Option<&MapFile> {
        let ticker = ticker.to_lowercase();
        self.iter()
            .find(|map_file| map_file.ticker_at(date) == Some(ticker.as_str()))
    }
}
