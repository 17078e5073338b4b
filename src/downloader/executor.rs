//! Sequential download executor
//!
//! Processes a resolved file list one file at a time, in order:
//! announce, check the local mirror, fetch under the billing context, write
//! atomically. Only "not found" responses are absorbed; every other failure
//! aborts the rest of the batch.

use std::sync::Arc;
use tracing::{debug, info};

use super::config::NOT_BILLED_MESSAGE;
use super::overwrite::{Confirm, FixedAnswer, OverwriteState};
use super::progress::{ProgressObserver, TracingProgress};
use super::DownloadError;
use crate::fetcher::{CatalogClient, CatalogError};
use crate::metrics::{self, SkipReason};
use crate::output::{write_atomic, LocalMirror};
use crate::RemoteFileDescriptor;

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Content fetched and written to the mirror
    Written {
        /// Size of the written file
        bytes: u64,
    },
    /// File exists locally and overwriting was refused
    SkippedExisting,
    /// Catalog does not carry the file; nothing was billed
    NotInCatalog,
}

/// Totals for one `download_all` batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Files written
    pub downloaded: usize,
    /// Files kept because overwriting was refused
    pub skipped_existing: usize,
    /// Files the catalog reported as missing
    pub not_in_catalog: usize,
    /// Bytes written
    pub bytes: u64,
}

impl DownloadSummary {
    fn record(&mut self, outcome: FileOutcome) {
        match outcome {
            FileOutcome::Written { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            FileOutcome::SkippedExisting => self.skipped_existing += 1,
            FileOutcome::NotInCatalog => self.not_in_catalog += 1,
        }
    }
}

/// Downloads catalog files into a local mirror
pub struct DownloadExecutor {
    client: Arc<dyn CatalogClient>,
    mirror: LocalMirror,
    confirm: Arc<dyn Confirm>,
    observer: Arc<dyn ProgressObserver>,
}

impl DownloadExecutor {
    /// Create an executor writing below `data_dir`
    ///
    /// Defaults to declining overwrites without asking and to logging
    /// progress through `tracing`.
    pub fn new(client: Arc<dyn CatalogClient>, data_dir: impl Into<std::path::PathBuf>) -> Self {
        Self {
            client,
            mirror: LocalMirror::new(data_dir),
            confirm: Arc::new(FixedAnswer(false)),
            observer: Arc::new(TracingProgress),
        }
    }

    /// Set the confirmation used on the first overwrite conflict
    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Set the progress observer
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Catalog client in use
    pub fn client(&self) -> &Arc<dyn CatalogClient> {
        &self.client
    }

    /// Local mirror in use
    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }

    /// Progress observer in use
    pub fn observer(&self) -> &Arc<dyn ProgressObserver> {
        &self.observer
    }

    /// Download every file in order
    ///
    /// # Arguments
    /// * `files` - Resolved descriptors; each is announced before it is fetched
    /// * `overwrite_flag` - Replace existing files without asking
    /// * `overwrite_state` - Run-scoped decision shared across batches
    /// * `organization_id` - Organization billed for the downloads
    ///
    /// # Errors
    /// The first non "not found" catalog error, or any filesystem error,
    /// stops the batch. Files already written stay on disk.
    pub async fn download_all(
        &self,
        files: &[RemoteFileDescriptor],
        overwrite_flag: bool,
        overwrite_state: &OverwriteState,
        organization_id: &str,
    ) -> Result<DownloadSummary, DownloadError> {
        let total = files.len();
        let mut summary = DownloadSummary::default();

        for (i, file) in files.iter().enumerate() {
            self.observer
                .file_started(i + 1, total, &file.path, file.price);

            let outcome = self
                .download_one(&file.path, overwrite_flag, overwrite_state, organization_id)
                .await?;
            summary.record(outcome);
        }

        info!(
            downloaded = summary.downloaded,
            skipped_existing = summary.skipped_existing,
            not_in_catalog = summary.not_in_catalog,
            bytes = summary.bytes,
            "Download batch finished"
        );
        Ok(summary)
    }

    /// Download a single catalog path into the mirror
    pub async fn download_one(
        &self,
        relative_path: &str,
        overwrite_flag: bool,
        overwrite_state: &OverwriteState,
        organization_id: &str,
    ) -> Result<FileOutcome, DownloadError> {
        let local_path = self.mirror.local_path(relative_path)?;

        if local_path.exists() {
            let display_path = local_path.display().to_string();
            let overwrite = overwrite_state
                .should_overwrite(
                    overwrite_flag,
                    &display_path,
                    self.confirm.as_ref(),
                    self.observer.as_ref(),
                )
                .await;

            if !overwrite {
                debug!(path = %relative_path, "Keeping existing file");
                metrics::record_file_skipped(SkipReason::Existing);
                return Ok(FileOutcome::SkippedExisting);
            }
        }

        let content = match self.client.fetch_file(relative_path, organization_id).await {
            Ok(content) => content,
            Err(CatalogError::NotFound(_)) => {
                self.observer.warning(&format!(
                    "{relative_path} does not exist in the data catalog\n{NOT_BILLED_MESSAGE}"
                ));
                metrics::record_file_skipped(SkipReason::NotInCatalog);
                return Ok(FileOutcome::NotInCatalog);
            }
            Err(e) => return Err(e.into()),
        };

        write_atomic(&local_path, &content)?;

        let bytes = content.len() as u64;
        metrics::record_file_downloaded(bytes);
        debug!(path = %relative_path, bytes = bytes, "Stored file");
        Ok(FileOutcome::Written { bytes })
    }
}
