//! Rendering errors.

use std::path::PathBuf;
use thiserror::Error;

use forecast_common::GridError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Frame index {index} out of range (catalog has {len} frames)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to load frame {path}: {source}")]
    FrameLoad {
        path: PathBuf,
        #[source]
        source: GridError,
    },

    #[error("Invalid color bounds: {0}")]
    InvalidBounds(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("Image encoding failed: {0}")]
    Encode(String),
}

impl RenderError {
    /// Recoverable errors leave the previous frame on screen.
    pub fn is_frame_load(&self) -> bool {
        matches!(self, RenderError::FrameLoad { .. })
    }
}
