//! Local mirror output

pub mod path;
pub mod writer;

pub use path::LocalMirror;
pub use writer::{read_bytes, write_atomic};

/// Output errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Catalog path would land outside the data directory
    #[error("path escapes the data directory: {0}")]
    PathEscapesRoot(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
