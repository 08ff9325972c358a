//! Error types for the forecast viewer.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for catalog construction.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for grid loading.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while turning a directory listing into a catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Malformed forecast filename '{filename}': {reason}")]
    MalformedFilename { filename: String, reason: String },

    #[error("No forecast files found")]
    EmptyCatalog,
}

impl CatalogError {
    pub(crate) fn malformed(filename: &str, reason: impl Into<String>) -> Self {
        CatalogError::MalformedFilename {
            filename: filename.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by a grid data source while decoding one frame.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GRIB2 data in {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("No {level_type} {level} message found in {path}")]
    LevelNotFound {
        path: PathBuf,
        level_type: String,
        level: u32,
    },

    #[error("Grid shape mismatch: {values} values for {rows}x{cols} grid")]
    ShapeMismatch {
        values: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Decoding {path} exceeded {timeout:?}")]
    Timeout { path: PathBuf, timeout: Duration },

    #[error("Grid decoder stopped unexpectedly: {0}")]
    Aborted(String),
}
