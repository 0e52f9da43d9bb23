//! Error types for roikit-filter
//!
//! Histogram, spectral and point operations validate their parameters
//! up front and report failures through [`FilterError`]. A failed
//! operation never writes to the region buffer.

use thiserror::Error;

/// Errors that can occur during filtering operations
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] roikit_core::Error),

    /// Color space error
    #[error("color error: {0}")]
    Color(#[from] roikit_color::ColorError),

    /// Invalid parameters
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The processed plane does not cover the region channel exactly
    #[error("processed plane has {actual} samples, the region channel has {expected}")]
    PlaneSizeMismatch {
        /// Pixels in one region channel
        expected: usize,
        /// Samples produced by the transform
        actual: usize,
    },

    /// Converting to hsv and back changed the buffer shape
    #[error("color round trip changed the shape from {expected:?} to {actual:?}")]
    ColorRoundTrip {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
