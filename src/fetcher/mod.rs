//! Catalog transport implementations

use async_trait::async_trait;
use bytes::Bytes;

pub mod archive;
pub mod http;

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The requested file does not exist in the catalog (nothing was billed)
    #[error("{0} does not exist in the data catalog")]
    NotFound(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// API error response
    #[error("API error: {0}")]
    ApiError(String),

    /// Response parse error
    #[error("parse error: {0}")]
    ParseError(String),

    /// Network error
    #[error("network error: {0}")]
    NetworkError(String),

    /// Archive error
    #[error("archive error: {0}")]
    ArchiveError(String),

    /// A listed path matched a date pattern but its capture is not a date
    #[error("malformed catalog entry {path}: {reason}")]
    MalformedCatalogEntry {
        /// Offending remote path
        path: String,
        /// Why the capture could not be used
        reason: String,
    },

    /// A path pattern failed to compile or has the wrong number of groups
    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Compilation failure
        reason: String,
    },

    /// The product specification cannot be resolved against the catalog
    #[error("invalid product specification: {0}")]
    InvalidSpecification(String),
}

impl CatalogError {
    /// Whether this is the absorbable "file not found" condition
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Remote data catalog: prefix listings and billed file retrieval
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// List all catalog paths under a prefix
    ///
    /// # Arguments
    /// * `prefix` - Path prefix relative to the data root (e.g., "option/usa/minute/aapl/")
    ///
    /// # Returns
    /// Paths relative to the data root, in the order the catalog returns them
    async fn list_entries(&self, prefix: &str) -> CatalogResult<Vec<String>>;

    /// Fetch the content of a single catalog file
    ///
    /// # Arguments
    /// * `path` - File path relative to the data root
    /// * `organization_id` - Organization billed for the download
    ///
    /// # Errors
    /// Returns [`CatalogError::NotFound`] when the file is not in the catalog,
    /// any other variant for transport or API failures
    async fn fetch_file(&self, path: &str, organization_id: &str) -> CatalogResult<Bytes>;

    /// Get the base URL for this client
    fn base_url(&self) -> &str;
}
