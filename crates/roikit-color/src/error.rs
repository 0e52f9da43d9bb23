//! Error types for roikit-color

use thiserror::Error;

/// Errors that can occur during color processing operations
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] roikit_core::Error),

    /// Color space name other than "rgb" or "hsv"
    #[error("illegal colorspace: {0:?} (expected \"rgb\" or \"hsv\")")]
    IllegalColorspace(String),

    /// Unsupported channel count for this operation
    #[error("unsupported channel count: expected {expected}, got {actual}")]
    UnsupportedChannels { expected: usize, actual: usize },
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
