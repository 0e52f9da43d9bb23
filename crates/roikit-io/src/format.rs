//! Image format detection
//!
//! Selects PGM or PPM from a file extension, and recognises the PNM magic
//! numbers at the start of encoded data.

use crate::{IoError, IoResult};
use std::fmt;
use std::path::Path;

/// Magic numbers for PNM detection
mod magic {
    pub const PGM_ASCII: &[u8] = b"P2";
    pub const PPM_ASCII: &[u8] = b"P3";
    pub const PGM_BINARY: &[u8] = b"P5";
    pub const PPM_BINARY: &[u8] = b"P6";
}

/// The two supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable graymap, one channel
    Pgm,
    /// Portable pixmap, three channels
    Ppm,
}

impl ImageFormat {
    /// Select a format from the extension of `path` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`IoError::IncorrectExtension`] for any other extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> IoResult<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }

    /// Select a format from a bare extension such as `"pgm"`.
    pub fn from_extension(ext: &str) -> IoResult<Self> {
        if ext.eq_ignore_ascii_case("pgm") {
            Ok(ImageFormat::Pgm)
        } else if ext.eq_ignore_ascii_case("ppm") {
            Ok(ImageFormat::Ppm)
        } else {
            Err(IoError::IncorrectExtension(ext.to_string()))
        }
    }

    /// Get the canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Pgm => "pgm",
            ImageFormat::Ppm => "ppm",
        }
    }

    /// Number of channels stored by this format.
    pub fn channels(self) -> usize {
        match self {
            ImageFormat::Pgm => 1,
            ImageFormat::Ppm => 3,
        }
    }

    /// Format that stores buffers with `channels` channels.
    pub fn for_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(ImageFormat::Pgm),
            3 => Some(ImageFormat::Ppm),
            _ => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageFormat::Pgm => f.write_str("PGM"),
            ImageFormat::Ppm => f.write_str("PPM"),
        }
    }
}

/// Detect the format of PNM data from its magic number
pub fn detect_format_from_bytes(data: &[u8]) -> IoResult<ImageFormat> {
    if data.len() < 2 {
        return Err(IoError::DecodeError(
            "not enough data to detect format".to_string(),
        ));
    }

    let first_two = &data[..2];
    if first_two == magic::PGM_ASCII || first_two == magic::PGM_BINARY {
        Ok(ImageFormat::Pgm)
    } else if first_two == magic::PPM_ASCII || first_two == magic::PPM_BINARY {
        Ok(ImageFormat::Ppm)
    } else {
        Err(IoError::DecodeError(format!(
            "unknown magic number {:?}",
            String::from_utf8_lossy(first_two)
        )))
    }
}
