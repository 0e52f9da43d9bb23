//! Roikit I/O - Image file reading and writing
//!
//! This crate provides the file boundary of the roikit toolkit:
//!
//! - **Codec** ([`pnm`]): PGM (one channel) and PPM (three channels),
//!   ASCII and binary on read, binary on write
//! - **Format selection** ([`format`]): by file extension
//! - **Diagnostic artifacts** ([`artifacts`]): uniquely named snapshot
//!   files, drained and deleted by the batch runner
//!
//! # Examples
//!
//! ```no_run
//! use roikit_io::{read_image, write_image};
//!
//! let buf = read_image("input.pgm").unwrap();
//! write_image(&buf, "output.pgm").unwrap();
//! ```

pub mod artifacts;
mod error;
pub mod format;
pub mod pnm;

pub use artifacts::ArtifactTracker;
pub use error::{IoError, IoResult};
pub use format::{ImageFormat, detect_format_from_bytes};
pub use pnm::{read_pnm, write_pnm};

use roikit_core::PixelBuffer;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;

/// Read an image from a file path.
///
/// The extension selects the expected format; the decoded channel count
/// must match it.
///
/// # Errors
///
/// - [`IoError::IncorrectExtension`] for anything but `.pgm` / `.ppm`
/// - [`IoError::NotFound`] if the path is not an existing regular file
/// - [`IoError::DecodeError`] for malformed or empty data, or when the
///   data holds the other format
pub fn read_image<P: AsRef<Path>>(path: P) -> IoResult<PixelBuffer> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let buf = read_pnm(BufReader::new(file))?;
    if buf.channels() != format.channels() {
        return Err(IoError::DecodeError(format!(
            "{} holds {} channel(s) but the .{} extension requires {}",
            path.display(),
            buf.channels(),
            format.extension(),
            format.channels()
        )));
    }
    Ok(buf)
}

/// Read an image from memory.
pub fn read_image_mem(data: &[u8]) -> IoResult<PixelBuffer> {
    detect_format_from_bytes(data)?;
    read_pnm(Cursor::new(data))
}

/// Write an image to a file path.
///
/// # Errors
///
/// - [`IoError::IncorrectExtension`] for anything but `.pgm` / `.ppm`
/// - [`IoError::ChannelMismatch`] if the buffer does not have the
///   channel count of that format
pub fn write_image<P: AsRef<Path>>(buf: &PixelBuffer, path: P) -> IoResult<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;
    if buf.channels() != format.channels() {
        return Err(IoError::ChannelMismatch {
            format,
            actual: buf.channels(),
        });
    }

    let file = File::create(path)?;
    write_pnm(buf, BufWriter::new(file))
}

/// Encode an image to memory.
pub fn write_image_mem(buf: &PixelBuffer) -> IoResult<Vec<u8>> {
    let mut out = Vec::new();
    write_pnm(buf, &mut out)?;
    Ok(out)
}
