//! Catalog resolution
//!
//! Turns a [`ProductSpecification`] into the ordered list of catalog files
//! that satisfy it.
//!
//! # Overview
//!
//! 1. **Layout**: the [`crate::registry`] supplies base directory, listing
//!    prefix, date pattern and file template for the specification
//! 2. **Matching**: [`PathPattern`] extracts the date of every listed path,
//!    discarding paths of other data types or styles
//! 3. **Range**: dates are de-duplicated, sorted and clipped to the inclusive
//!    `[start, end]` bounds of the request
//! 4. **Chains**: chain files are stored per date, so they are enumerated from
//!    a [`TradingCalendar`] instead of a listing
//!
//! Listing a ticker prefix is an existence probe as well: a ticker without a
//! single matching file is reported as absent. The probe is skipped for chains
//! because their files have no ticker-indexed prefix.

pub mod calendar;
pub mod pattern;

pub use calendar::{TradingCalendar, WeekdayCalendar};
pub use pattern::{parse_catalog_date, PathPattern};

use crate::fetcher::{CatalogClient, CatalogError, CatalogResult};
use crate::registry::{Layout, ProductRegistry, RegistryError, ResolvedProduct};
use crate::{ProductSpecification, RemoteFileDescriptor};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};

impl From<RegistryError> for CatalogError {
    fn from(error: RegistryError) -> Self {
        CatalogError::InvalidSpecification(error.to_string())
    }
}

/// Resolves product specifications against the remote catalog
pub struct CatalogResolver {
    client: Arc<dyn CatalogClient>,
    calendar: Arc<dyn TradingCalendar>,
    registry: ProductRegistry,
}

impl CatalogResolver {
    /// Create a resolver over an explicit registry
    pub fn new(
        client: Arc<dyn CatalogClient>,
        calendar: Arc<dyn TradingCalendar>,
        registry: ProductRegistry,
    ) -> Self {
        Self {
            client,
            calendar,
            registry,
        }
    }

    /// Create a resolver over the embedded product registry
    pub fn with_embedded_registry(
        client: Arc<dyn CatalogClient>,
        calendar: Arc<dyn TradingCalendar>,
    ) -> Result<Self, RegistryError> {
        Ok(Self::new(client, calendar, ProductRegistry::load_embedded()?))
    }

    /// Product registry in use
    pub fn registry(&self) -> &ProductRegistry {
        &self.registry
    }

    fn resolve_layout(&self, spec: &ProductSpecification) -> CatalogResult<ResolvedProduct> {
        spec.validate()
            .map_err(CatalogError::InvalidSpecification)?;
        Ok(self.registry.resolve(spec)?)
    }

    /// List a prefix and extract the date of every matching entry
    ///
    /// Non-matching entries are discarded; a match whose capture is not a date
    /// aborts with [`CatalogError::MalformedCatalogEntry`].
    pub async fn list_dates(
        &self,
        prefix: &str,
        pattern: &PathPattern,
    ) -> CatalogResult<Vec<NaiveDate>> {
        let entries = self.client.list_entries(prefix).await?;
        crate::metrics::record_catalog_listing();

        let mut dates = Vec::new();
        for entry in &entries {
            if let Some(date) = pattern.extract_date(entry)? {
                dates.push(date);
            }
        }

        debug!(
            prefix = %prefix,
            pattern = %pattern.as_str(),
            listed = entries.len(),
            matched = dates.len(),
            "Matched catalog entries"
        );
        Ok(dates)
    }

    /// Whether at least one entry under `prefix` matches `pattern`
    pub async fn probe_prefix(&self, prefix: &str, pattern: &PathPattern) -> CatalogResult<bool> {
        Ok(!self.list_dates(prefix, pattern).await?.is_empty())
    }

    /// Whether the catalog holds any file for the specification's ticker
    ///
    /// Always `true` without a listing call for tradable-date layouts (chains),
    /// since their files are not indexed by ticker.
    pub async fn probe_exists(&self, spec: &ProductSpecification) -> CatalogResult<bool> {
        let layout = self.registry.resolve(spec)?;

        match (layout.layout(), layout.date_pattern()) {
            (Layout::TickerDated, Some(pattern)) => {
                let pattern = PathPattern::new(pattern)?;
                self.probe_prefix(layout.listing_prefix(), &pattern).await
            }
            _ => Ok(true),
        }
    }

    /// Sorted, de-duplicated dates under `prefix`, clipped to `[start, end]`
    ///
    /// A missing bound leaves that side of the range open.
    pub async fn resolve_date_range(
        &self,
        prefix: &str,
        pattern: &PathPattern,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> CatalogResult<BTreeSet<NaiveDate>> {
        let dates = self.list_dates(prefix, pattern).await?;

        Ok(dates
            .into_iter()
            .filter(|date| start.map_or(true, |s| *date >= s))
            .filter(|date| end.map_or(true, |e| *date <= e))
            .collect())
    }

    /// All dates the catalog offers for a specification, ignoring its bounds
    ///
    /// Returns `None` for tradable-date layouts, whose availability is not
    /// discoverable by listing.
    pub async fn available_dates(
        &self,
        spec: &ProductSpecification,
    ) -> CatalogResult<Option<BTreeSet<NaiveDate>>> {
        let layout = self.registry.resolve(spec)?;

        match (layout.layout(), layout.date_pattern()) {
            (Layout::TickerDated, Some(pattern)) => {
                let pattern = PathPattern::new(pattern)?;
                let dates = self
                    .resolve_date_range(layout.listing_prefix(), &pattern, None, None)
                    .await?;
                Ok(Some(dates))
            }
            _ => Ok(None),
        }
    }

    /// Dates satisfying a specification, ascending and without duplicates
    pub async fn resolve_dates(&self, spec: &ProductSpecification) -> CatalogResult<Vec<NaiveDate>> {
        let layout = self.resolve_layout(spec)?;
        self.dates_for(spec, &layout).await
    }

    async fn dates_for(
        &self,
        spec: &ProductSpecification,
        layout: &ResolvedProduct,
    ) -> CatalogResult<Vec<NaiveDate>> {
        match layout.layout() {
            Layout::TradableDate => {
                let (Some(start), Some(end)) = (spec.start_date(), spec.end_date()) else {
                    return Err(CatalogError::InvalidSpecification(
                        "tradable-date products need both a start and an end date".to_string(),
                    ));
                };
                Ok(self
                    .calendar
                    .tradable_dates(spec.security_type(), start, end)
                    .into_iter()
                    .filter(|date| *date >= start && *date <= end)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect())
            }
            Layout::TickerDated => {
                let pattern = layout.date_pattern().ok_or_else(|| {
                    CatalogError::InvalidSpecification(format!(
                        "layout {} has no date pattern",
                        layout.base()
                    ))
                })?;
                let pattern = PathPattern::new(pattern)?;
                Ok(self
                    .resolve_date_range(
                        layout.listing_prefix(),
                        &pattern,
                        spec.start_date(),
                        spec.end_date(),
                    )
                    .await?
                    .into_iter()
                    .collect())
            }
        }
    }

    /// Build the ordered list of files satisfying a specification
    ///
    /// # Arguments
    /// * `spec` - The request to resolve
    /// * `price` - Per-file price quoted by the catalog, carried into every descriptor
    ///
    /// # Returns
    /// Descriptors in ascending date order; empty when nothing matches
    pub async fn build_file_list(
        &self,
        spec: &ProductSpecification,
        price: Decimal,
    ) -> CatalogResult<Vec<RemoteFileDescriptor>> {
        let layout = self.resolve_layout(spec)?;
        let dates = self.dates_for(spec, &layout).await?;

        let files: Vec<RemoteFileDescriptor> = dates
            .into_iter()
            .map(|date| RemoteFileDescriptor::new(layout.file_path(date), price))
            .collect();

        info!(
            security_type = %spec.security_type(),
            data_type = %spec.data_type(),
            ticker = %spec.ticker(),
            files = files.len(),
            "Resolved catalog files"
        );
        Ok(files)
    }
}
