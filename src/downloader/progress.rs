//! Progress reporting for download batches.
//!
//! The executor announces every file before fetching it and routes warnings
//! and notices through a [`ProgressObserver`]. The default observer logs via
//! `tracing`; the CLI installs a terminal progress bar instead.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{info, warn};

/// Receiver for per-file progress and user-facing messages
pub trait ProgressObserver: Send + Sync {
    /// A file is about to be fetched. `index` is 1-based.
    fn file_started(&self, index: usize, total: usize, path: &str, price: Decimal);

    /// Something the user should know about but that does not stop the run
    fn warning(&self, message: &str);

    /// Informational message
    fn notice(&self, message: &str);
}

/// Observer that writes everything to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn file_started(&self, index: usize, total: usize, path: &str, price: Decimal) {
        info!(
            index = index,
            total = total,
            path = %path,
            price = %price,
            "{}",
            format_file_progress(index, total, path, price)
        );
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }

    fn notice(&self, message: &str) {
        info!("{}", message);
    }
}

/// Format a price as whole QCC with thousands separators (`1,234`)
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Progress line for one file: `[1/3] Downloading {path} (1,234 QCC)`
pub fn format_file_progress(index: usize, total: usize, path: &str, price: Decimal) -> String {
    format!(
        "[{index}/{total}] Downloading {path} ({} QCC)",
        format_price(price)
    )
}
