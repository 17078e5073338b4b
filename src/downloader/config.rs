//! Download configuration
//!
//! Constants shared by the catalog client and the orchestrator, plus the
//! on-disk configuration file (`lean.json` style):
//!
//! ```json
//! {
//!   "data-folder": "data",
//!   "organization-id": "abc123",
//!   "api-url": "https://www.quantconnect.com/api/v2"
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default catalog API root
pub const DEFAULT_API_URL: &str = "https://www.quantconnect.com/api/v2";

/// Default local data directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Catalog prefix holding the map file bundles
pub const MAP_FILES_PREFIX: &str = "equity/usa/map_files";

/// HTTP request timeout in seconds, sized for large option bundles
pub const HTTP_TIMEOUT_SECS: u64 = 300;

/// Question asked on the first overwrite conflict of a run
pub const OVERWRITE_PROMPT: &str =
    "Do you want to temporarily enable overwriting for the previously selected items?";

/// Warning attached to every file that was skipped without charge
pub const NOT_BILLED_MESSAGE: &str = "You have not been billed for this file";

/// Notice shown before the free map file bundle is fetched
pub const MAP_FILES_NOTICE: &str = "Downloading the latest map files (free)";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {reason}")]
    ReadError {
        /// Config file path
        path: String,
        /// Underlying IO error
        reason: String,
    },

    /// Config file is not valid JSON
    #[error("failed to parse {path}: {reason}")]
    ParseError {
        /// Config file path
        path: String,
        /// Underlying parse error
        reason: String,
    },
}

/// On-disk downloader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloaderConfig {
    /// Local data directory, relative paths resolve against the config file
    #[serde(rename = "data-folder", default)]
    pub data_folder: Option<PathBuf>,

    /// Organization billed for downloads
    #[serde(rename = "organization-id", default)]
    pub organization_id: Option<String>,

    /// Catalog API root
    #[serde(rename = "api-url", default)]
    pub api_url: Option<String>,

    #[serde(skip)]
    config_dir: Option<PathBuf>,
}

impl DownloaderConfig {
    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut config = Self::from_json(&content).map_err(|reason| ConfigError::ParseError {
            path: path.display().to_string(),
            reason,
        })?;
        config.config_dir = path.parent().map(Path::to_path_buf);

        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Resolved data directory
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_folder {
            Some(folder) if folder.is_absolute() => folder.clone(),
            Some(folder) => match &self.config_dir {
                Some(dir) => dir.join(folder),
                None => folder.clone(),
            },
            None => PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Resolved API root
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }
}
