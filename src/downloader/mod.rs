//! Download orchestration and overwrite policy
//!
//! This module downloads resolved catalog files into the local mirror while
//! keeping billing surprises out of the way.
//!
//! # Overview
//!
//! 1. **Resolution**: build the file list with [`crate::catalog::CatalogResolver`]
//! 2. **Execution**: hand it to [`executor::DownloadExecutor::download_all`]
//! 3. **Progress**: every file is announced to a [`progress::ProgressObserver`]
//!    before it is fetched, in list order
//! 4. **Overwrites**: existing files are only replaced when the caller allows
//!    it or the user confirms once per run through [`overwrite::OverwriteState`]
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use data_catalog_downloader::downloader::{DownloadExecutor, FixedAnswer, OverwriteState};
//! use data_catalog_downloader::fetcher::http::HttpCatalogClient;
//! use data_catalog_downloader::RemoteFileDescriptor;
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Arc::new(HttpCatalogClient::with_default_client("https://www.quantconnect.com/api/v2")?);
//! let executor = DownloadExecutor::new(client, "./data")
//!     .with_confirm(Arc::new(FixedAnswer(false)));
//!
//! let files = vec![RemoteFileDescriptor::new(
//!     "equity/usa/minute/spy/20210104_trade.zip",
//!     Decimal::ONE,
//! )];
//! let summary = executor
//!     .download_all(&files, false, &OverwriteState::new(), "organization-id")
//!     .await?;
//! println!("{} files written", summary.downloaded);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All operations return `Result<T, DownloadError>`:
//! - Catalog "not found" responses are absorbed (warned, not billed)
//! - Every other catalog error aborts the remaining batch
//! - Filesystem errors abort the remaining batch
//! - No request is retried at this layer

pub mod config;
pub mod executor;
pub mod overwrite;
pub mod progress;

pub use executor::{DownloadExecutor, DownloadSummary, FileOutcome};
pub use overwrite::{
    Confirm, FixedAnswer, OverwriteDecision, OverwriteState, PolicyStep, TerminalConfirm,
};
pub use progress::{ProgressObserver, TracingProgress};

use crate::fetcher::CatalogError;
use crate::mapfile::MapFileError;
use crate::output::OutputError;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Catalog listing or transport failure
    #[error("catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    /// Local directory creation or write failure
    #[error("filesystem error: {0}")]
    FilesystemError(#[from] OutputError),

    /// Map file bundle could not be used
    #[error("map file error: {0}")]
    MapFileError(#[from] MapFileError),
}
