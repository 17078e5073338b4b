//! Product registry for catalog path grammars
//!
//! The registry maps a `{security type, data type}` pair to the layout of its
//! files in the catalog: the base directory, the prefix to list, the
//! date-capturing pattern and the file name template. Every security type
//! shares the same resolution algorithm; only these parameters differ.
//!
//! Templates use `{market}`, `{resolution}`, `{ticker}`, `{data_type}`,
//! `{style}`, `{base}` and `{date}` placeholders. Values are lower-cased when
//! substituted into paths and regex-escaped when substituted into patterns.

use crate::{DataType, ProductSpecification, Resolution, SecurityType, CATALOG_DATE_FORMAT};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Embedded registry data
const REGISTRY_JSON: &str = include_str!("products.json");

/// How the files of a product are discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    /// One file per date under a ticker directory, discovered by listing
    TickerDated,
    /// One file per tradable date, stored without a ticker-indexed prefix
    TradableDate,
}

/// Registry of catalog path grammars
#[derive(Debug, Clone)]
pub struct ProductRegistry {
    products: Vec<ProductLayout>,
}

impl ProductRegistry {
    /// Load embedded registry, returning an owned copy
    pub fn load_embedded() -> Result<Self, RegistryError> {
        Self::from_json(REGISTRY_JSON)
    }

    /// Parse registry from JSON string
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawRegistry = serde_json::from_str(json)
            .map_err(|e| RegistryError::ParseError(format!("Failed to parse registry: {e}")))?;

        for product in &raw.products {
            if product.layout == Layout::TickerDated && product.date_pattern.is_none() {
                return Err(RegistryError::ParseError(format!(
                    "{} layout for {:?} has no date pattern",
                    product.security_type, product.data_types
                )));
            }
        }

        debug!(
            schema_version = %raw.schema_version,
            last_updated = %raw.last_updated,
            products = raw.products.len(),
            "Loaded product registry"
        );
        Ok(Self {
            products: raw.products,
        })
    }

    /// Get all product layouts
    pub fn products(&self) -> &[ProductLayout] {
        &self.products
    }

    /// Find the layout serving a security type and data type
    pub fn find(&self, security_type: SecurityType, data_type: DataType) -> Option<&ProductLayout> {
        self.products
            .iter()
            .find(|p| p.security_type == security_type && p.data_types.contains(&data_type))
    }

    /// Resolve the layout of a specification into concrete paths and patterns
    pub fn resolve(&self, spec: &ProductSpecification) -> Result<ResolvedProduct, RegistryError> {
        let layout = self
            .find(spec.security_type(), spec.data_type())
            .ok_or_else(|| {
                RegistryError::NotFound(format!(
                    "no catalog layout for {} {} data",
                    spec.security_type(),
                    spec.data_type()
                ))
            })?;

        layout.resolve(spec)
    }
}

/// Path grammar of one product family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductLayout {
    security_type: SecurityType,
    data_types: Vec<DataType>,
    #[serde(default)]
    resolutions: Vec<Resolution>,
    layout: Layout,
    base: String,
    listing_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_pattern: Option<String>,
    file: String,
}

impl ProductLayout {
    /// Security type served by this layout
    pub fn security_type(&self) -> SecurityType {
        self.security_type
    }

    /// Data types served by this layout
    pub fn data_types(&self) -> &[DataType] {
        &self.data_types
    }

    /// Supported resolutions (empty when the resolution is not part of the path)
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    /// Discovery layout
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Substitute the specification into this layout's templates
    pub fn resolve(&self, spec: &ProductSpecification) -> Result<ResolvedProduct, RegistryError> {
        if !self.resolutions.is_empty() && !self.resolutions.contains(&spec.resolution()) {
            return Err(RegistryError::UnsupportedResolution(format!(
                "{} {} data is not available at {} resolution",
                spec.security_type(),
                spec.data_type(),
                spec.resolution()
            )));
        }

        let needs_style = self.file.contains("{style}")
            || self
                .date_pattern
                .as_deref()
                .is_some_and(|p| p.contains("{style}"));
        let style = match spec.option_style() {
            Some(style) => style.to_string(),
            None if needs_style => {
                return Err(RegistryError::MissingParameter(format!(
                    "{} {} data requires an option style",
                    spec.security_type(),
                    spec.data_type()
                )))
            }
            None => String::new(),
        };

        let values = [
            ("market", spec.market().to_lowercase()),
            ("resolution", spec.resolution().to_string()),
            ("ticker", spec.ticker().to_lowercase()),
            ("data_type", spec.data_type().path_name().to_string()),
            ("style", style),
        ];

        let base = render(&self.base, &values);
        let with_base = |template: &str| render(template, &values).replace("{base}", &base);

        let escaped: Vec<(&str, String)> = values
            .iter()
            .map(|(key, value)| (*key, regex::escape(value)))
            .collect();

        Ok(ResolvedProduct {
            layout: self.layout,
            listing_prefix: with_base(&self.listing_prefix),
            date_pattern: self
                .date_pattern
                .as_deref()
                .map(|pattern| render(pattern, &escaped)),
            file_template: with_base(&self.file),
            base,
        })
    }
}

/// Replace `{key}` placeholders with their values
fn render(template: &str, values: &[(&str, String)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{key}}}"), value)
    })
}

/// Concrete catalog layout of a single specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    layout: Layout,
    base: String,
    listing_prefix: String,
    date_pattern: Option<String>,
    file_template: String,
}

impl ResolvedProduct {
    /// Discovery layout
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Base directory (e.g., "option/usa/minute")
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Prefix to list when probing or resolving dates
    pub fn listing_prefix(&self) -> &str {
        &self.listing_prefix
    }

    /// Date-capturing pattern, present for ticker-dated layouts
    pub fn date_pattern(&self) -> Option<&str> {
        self.date_pattern.as_deref()
    }

    /// Catalog path of the file for a date
    pub fn file_path(&self, date: NaiveDate) -> String {
        self.file_template
            .replace("{date}", &date.format(CATALOG_DATE_FORMAT).to_string())
    }
}

/// Raw registry structure for deserialization
#[derive(Debug, Deserialize)]
struct RawRegistry {
    schema_version: String,
    last_updated: String,
    products: Vec<ProductLayout>,
}

/// Errors that can occur when working with the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Failed to parse registry JSON
    #[error("registry parse error: {0}")]
    ParseError(String),

    /// No layout for the requested product
    #[error("product not found: {0}")]
    NotFound(String),

    /// Resolution not offered for the product
    #[error("unsupported resolution: {0}")]
    UnsupportedResolution(String),

    /// Required template parameter missing from the specification
    #[error("missing parameter: {0}")]
    MissingParameter(String),
}
