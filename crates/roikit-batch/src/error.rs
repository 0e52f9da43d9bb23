//! Error types for roikit-batch
//!
//! Wraps the errors of every crate an operation can reach, plus the
//! script-level failures of the interpreter itself.

use thiserror::Error;

/// Errors raised while parsing or running a batch script
#[derive(Debug, Error)]
pub enum BatchError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] roikit_core::Error),

    /// Color space error
    #[error("color error: {0}")]
    Color(#[from] roikit_color::ColorError),

    /// Image or artifact I/O error
    #[error("I/O error: {0}")]
    Io(#[from] roikit_io::IoError),

    /// Operation failure
    #[error("filter error: {0}")]
    Filter(#[from] roikit_filter::FilterError),

    /// Operation name missing from the registry
    #[error("unknown operation: {0}")]
    NotFound(String),

    /// Operation parameter that does not parse or is out of range
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed script line
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl From<std::io::Error> for BatchError {
    fn from(e: std::io::Error) -> Self {
        BatchError::Io(roikit_io::IoError::Io(e))
    }
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;
