//! Startup errors for the viewer service.

use std::path::PathBuf;
use thiserror::Error;

use forecast_common::{BboxParseError, CatalogError};
use renderer::RenderError;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No data directory configured (use --data-dir, VIEWER_DATA_DIR or data_dir in the config file)")]
    MissingDataDir,

    #[error("Invalid config value for {key}: {message}")]
    InvalidConfig { key: &'static str, message: String },

    #[error(transparent)]
    Extent(#[from] BboxParseError),

    #[error("Failed to list {dir}: {source}")]
    Listing {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
