//! Atomic file writes
//!
//! Content is written to a temporary file in the destination directory,
//! synced, then renamed over the destination. Readers never observe a
//! partially written file.

use super::{OutputError, OutputResult};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Write `content` to `path`, creating parent directories and replacing any
/// previous file
pub fn write_atomic(path: &Path, content: &[u8]) -> OutputResult<()> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent_dir).map_err(|e| {
        OutputError::IoError(format!(
            "Failed to create directory {}: {e}",
            parent_dir.display()
        ))
    })?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent_dir)
        .map_err(|e| OutputError::IoError(format!("Failed to create temp file: {e}")))?;

    temp_file
        .write_all(content)
        .map_err(|e| OutputError::IoError(format!("Failed to write to temp file: {e}")))?;

    // Flush buffer to OS and sync to disk before the rename
    temp_file
        .flush()
        .map_err(|e| OutputError::IoError(format!("Failed to flush temp file: {e}")))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| OutputError::IoError(format!("Failed to sync temp file: {e}")))?;

    temp_file.persist(path).map_err(|e| {
        OutputError::IoError(format!("Failed to persist {}: {}", path.display(), e.error))
    })?;

    debug!(path = %path.display(), bytes = content.len(), "Wrote file");
    Ok(())
}

/// Read a mirrored file back
pub fn read_bytes(path: &Path) -> OutputResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| OutputError::IoError(format!("Failed to read {}: {e}", path.display())))
}
