//! Terminal progress bar for download batches

use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::downloader::progress::format_file_progress;
use crate::downloader::ProgressObserver;

/// Progress observer drawing an `indicatif` bar
///
/// Warnings and notices are logged with the bar suspended so they do not
/// tear the bar line.
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// Create a bar; its length is set when the first file starts
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Self { bar }
    }

    /// Underlying bar
    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }

    /// Clear the bar once the batch is over
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for TerminalProgress {
    fn file_started(&self, index: usize, total: usize, path: &str, price: Decimal) {
        self.bar.set_length(total as u64);
        self.bar.set_position(index.saturating_sub(1) as u64);
        self.bar.set_message(path.to_string());
        self.bar
            .suspend(|| info!("{}", format_file_progress(index, total, path, price)));
    }

    fn warning(&self, message: &str) {
        self.bar.suspend(|| warn!("{}", message));
    }

    fn notice(&self, message: &str) {
        self.bar.suspend(|| info!("{}", message));
    }
}
