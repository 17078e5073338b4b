//! Process-lifetime map file cache
//!
//! The first request lists the map file prefix, downloads the newest bundle if
//! it is not mirrored yet, parses every entry and keeps the result. Later
//! requests are served from memory without touching the network.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{MapFile, MapFileError};
use crate::downloader::config::{MAP_FILES_NOTICE, MAP_FILES_PREFIX};
use crate::downloader::{DownloadError, DownloadExecutor, OverwriteState};
use crate::fetcher::archive::{is_archive, read_text_entries};
use crate::metrics;

/// Memoized map file bundle
///
/// Owned by the caller for one run. Concurrent first callers share a single
/// population; a failed population stores nothing and the next call retries.
#[derive(Debug, Default)]
pub struct MapFileCache {
    map_files: OnceCell<Arc<Vec<MapFile>>>,
}

impl MapFileCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the bundle has been loaded
    pub fn is_populated(&self) -> bool {
        self.map_files.initialized()
    }

    /// Every map file of the newest bundle, in archive order
    ///
    /// # Arguments
    /// * `executor` - Executor whose client and mirror are used for the bundle
    /// * `organization_id` - Organization used for the (free) download
    pub async fn get_map_files(
        &self,
        executor: &DownloadExecutor,
        organization_id: &str,
    ) -> Result<Arc<Vec<MapFile>>, DownloadError> {
        if let Some(map_files) = self.map_files.get() {
            metrics::record_map_file_cache_hit();
            debug!(count = map_files.len(), "Serving map files from memory");
            return Ok(map_files.clone());
        }

        let map_files = self
            .map_files
            .get_or_try_init(|| load_map_files(executor, organization_id))
            .await?;
        Ok(map_files.clone())
    }
}

/// Newest bundle in a listing: the greatest `.zip` path
///
/// Bundle names embed their `yyyymmdd` date, so the lexicographic maximum is
/// the newest bundle regardless of listing order.
pub fn select_latest_bundle(entries: &[String]) -> Option<&str> {
    entries
        .iter()
        .map(String::as_str)
        .filter(|entry| is_archive(entry))
        .max()
}

async fn load_map_files(
    executor: &DownloadExecutor,
    organization_id: &str,
) -> Result<Arc<Vec<MapFile>>, DownloadError> {
    let entries = executor.client().list_entries(MAP_FILES_PREFIX).await?;
    metrics::record_catalog_listing();

    let bundle = select_latest_bundle(&entries)
        .ok_or_else(|| MapFileError::NoBundle(MAP_FILES_PREFIX.to_string()))?;
    let bundle_path = executor.mirror().local_path(bundle)?;

    if !bundle_path.is_file() {
        executor.observer().notice(MAP_FILES_NOTICE);
        executor
            .download_one(bundle, true, &OverwriteState::new(), organization_id)
            .await?;

        if !bundle_path.is_file() {
            return Err(MapFileError::BundleUnavailable(bundle.to_string()).into());
        }
    }

    let map_files = parse_bundle(&bundle_path)?;
    info!(bundle = %bundle, count = map_files.len(), "Loaded map files");
    Ok(Arc::new(map_files))
}

fn parse_bundle(path: &Path) -> Result<Vec<MapFile>, DownloadError> {
    let entries = read_text_entries(path)?;

    let mut map_files = Vec::with_capacity(entries.len());
    for entry in entries {
        let map_file = MapFile::parse(&entry.content).map_err(|e| MapFileError::InvalidEntry {
            entry: entry.name.clone(),
            source: Box::new(e),
        })?;
        map_files.push(map_file.with_name(entry.name));
    }
    Ok(map_files)
}
