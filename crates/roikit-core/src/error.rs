//! Error types for roikit-core
//!
//! Provides a unified error type for the pixel buffer and region types.
//! Each variant captures enough context to report the offending index or
//! shape without exposing the buffer internals.

use thiserror::Error;

/// Roikit core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Pixel or channel address outside the buffer
    #[error(
        "pixel index ({row}, {col}, {channel}) is out of bounds for a {rows}x{cols}x{channels} buffer"
    )]
    OutOfBounds {
        row: usize,
        col: usize,
        channel: usize,
        rows: usize,
        cols: usize,
        channels: usize,
    },

    /// Two buffers that must share a shape do not
    #[error(
        "dimension mismatch: destination is {}x{}x{}, source is {}x{}x{}",
        .expected.0, .expected.1, .expected.2, .actual.0, .actual.1, .actual.2
    )]
    DimensionMismatch {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    /// Region placement does not fit the source buffer
    #[error(
        "region ({start_x}, {start_y}) to ({end_x}, {end_y}) does not fit a {rows}x{cols} image"
    )]
    RoiOutOfBounds {
        start_x: usize,
        start_y: usize,
        end_x: usize,
        end_y: usize,
        rows: usize,
        cols: usize,
    },

    /// Invalid buffer dimensions
    #[error("invalid buffer dimensions: {rows}x{cols}x{channels}")]
    InvalidDimension {
        rows: usize,
        cols: usize,
        channels: usize,
    },

    /// Parameter outside its documented domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias for roikit core operations
pub type Result<T> = std::result::Result<T, Error>;
