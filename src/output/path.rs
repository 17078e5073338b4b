//! Local mirror path mapping
//!
//! The local data directory mirrors the catalog: a catalog path such as
//! `option/usa/minute/aapl/20210104_trade_american.zip` is stored at
//! `{data_dir}/option/usa/minute/aapl/20210104_trade_american.zip`.
//!
//! # Usage Example
//!
//! ```rust
//! use data_catalog_downloader::output::LocalMirror;
//! use std::path::PathBuf;
//!
//! let mirror = LocalMirror::new("data");
//! let path = mirror.local_path("equity/usa/minute/spy/20210104_trade.zip").unwrap();
//! assert_eq!(path, PathBuf::from("data/equity/usa/minute/spy/20210104_trade.zip"));
//! ```

use super::{OutputError, OutputResult};
use std::path::{Component, Path, PathBuf};

/// Local data directory mirroring the catalog layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    /// Create a mirror rooted at a data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root data directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a catalog path to its local path
    ///
    /// # Security
    ///
    /// Catalog paths are reused verbatim, so only plain relative components
    /// are accepted. Absolute paths and `..` are rejected.
    pub fn local_path(&self, relative: &str) -> OutputResult<PathBuf> {
        let relative_path = Path::new(relative);

        let is_plain = relative_path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.is_empty() || !is_plain {
            return Err(OutputError::PathEscapesRoot(relative.to_string()));
        }

        Ok(self.root.join(relative_path))
    }

    /// Whether a catalog path already exists locally
    pub fn exists(&self, relative: &str) -> OutputResult<bool> {
        Ok(self.local_path(relative)?.exists())
    }
}
