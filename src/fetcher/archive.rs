//! ZIP archive access for mirrored catalog bundles
//!
//! Catalog bundles (map files) are downloaded as a single ZIP archive and
//! read back entry by entry, in archive order.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

use super::{CatalogError, CatalogResult};

/// File extension of catalog archives
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// A decoded text entry of an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    /// Entry name inside the archive
    pub name: String,
    /// UTF-8 content
    pub content: String,
}

/// Whether a catalog path names an archive
pub fn is_archive(path: &str) -> bool {
    path.ends_with(ARCHIVE_EXTENSION)
}

/// Read every file entry of an archive on disk as UTF-8 text
pub fn read_text_entries(path: &Path) -> CatalogResult<Vec<TextEntry>> {
    let file = File::open(path).map_err(|e| {
        CatalogError::ArchiveError(format!("Failed to open {}: {e}", path.display()))
    })?;
    read_text_entries_from(file)
}

/// Read every file entry of an archive from any seekable reader
pub fn read_text_entries_from<R: Read + Seek>(reader: R) -> CatalogResult<Vec<TextEntry>> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| CatalogError::ArchiveError(format!("Failed to open ZIP: {e}")))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| CatalogError::ArchiveError(format!("Failed to read ZIP entry: {e}")))?;

        if file.is_dir() {
            continue;
        }

        let name = file.name().to_string();
        let mut content = String::new();
        file.read_to_string(&mut content).map_err(|e| {
            CatalogError::ArchiveError(format!("Failed to read {name} as UTF-8 text: {e}"))
        })?;

        entries.push(TextEntry { name, content });
    }

    debug!("Read {} text entries from archive", entries.len());
    Ok(entries)
}
