//! I/O error types
//!
//! Provides a unified error type for the PGM/PPM codec and the artifact
//! tracker, so that callers only need to handle one error type.

use crate::ImageFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for image I/O operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (permission denied, short read, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path does not name an existing regular file
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The extension selects neither PGM nor PPM
    #[error("incorrect extension: {0:?} (expected .pgm or .ppm)")]
    IncorrectExtension(String),

    /// The buffer's channel count does not fit the chosen format
    #[error("{format} requires {} channel(s), got {actual}", .format.channels())]
    ChannelMismatch { format: ImageFormat, actual: usize },

    /// The file data is structurally invalid
    #[error("decode error: {0}")]
    DecodeError(String),

    /// An error from the core library
    #[error("core error: {0}")]
    Core(#[from] roikit_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
