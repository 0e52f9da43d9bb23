//! PNM (Portable Any Map) format support
//!
//! Reads PGM (P2 ASCII, P5 binary) and PPM (P3 ASCII, P6 binary) with a
//! maxval of at most 255, and writes binary P5/P6 with maxval 255.
//!
//! Samples of files with a maxval below 255 are rescaled to the full
//! `[0, 255]` range on read.

use crate::{ImageFormat, IoError, IoResult};
use roikit_core::PixelBuffer;
use std::io::{BufRead, Read, Write};

/// Largest raster, in samples, a header may announce
pub const MAX_PNM_SAMPLES: usize = 1 << 28;

/// Raster bytes reserved up front; the rest grows as data arrives
const INITIAL_RASTER_CAPACITY: usize = 1 << 16;

/// Parsed PNM header
#[derive(Debug, Clone, Copy)]
struct Header {
    format: ImageFormat,
    binary: bool,
    width: usize,
    height: usize,
    maxval: u32,
    samples: usize,
}

/// Byte-wise token reader for PNM headers and ASCII rasters
struct Tokens<R> {
    reader: R,
}

impl<R: BufRead> Tokens<R> {
    fn byte(&mut self) -> IoResult<Option<u8>> {
        let buf = self.reader.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        self.reader.consume(1);
        Ok(Some(b))
    }

    /// Next whitespace-delimited token, skipping `#` comments.
    ///
    /// The single whitespace byte ending the token is consumed, which
    /// leaves a binary raster positioned at its first sample.
    fn next(&mut self) -> IoResult<Option<String>> {
        let mut token = String::new();
        loop {
            let Some(b) = self.byte()? else {
                return Ok((!token.is_empty()).then_some(token));
            };
            if b == b'#' && token.is_empty() {
                while let Some(c) = self.byte()? {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                if !token.is_empty() {
                    return Ok(Some(token));
                }
            } else {
                token.push(b as char);
            }
        }
    }

    fn number(&mut self, what: &str) -> IoResult<u32> {
        let token = self
            .next()?
            .ok_or_else(|| IoError::DecodeError(format!("unexpected end of data reading {what}")))?;
        token
            .parse()
            .map_err(|_| IoError::DecodeError(format!("invalid {what}: {token:?}")))
    }
}

fn read_header<R: BufRead>(tokens: &mut Tokens<R>) -> IoResult<Header> {
    let magic = tokens
        .next()?
        .ok_or_else(|| IoError::DecodeError("empty PNM data".to_string()))?;
    let (format, binary) = match magic.as_str() {
        "P2" => (ImageFormat::Pgm, false),
        "P5" => (ImageFormat::Pgm, true),
        "P3" => (ImageFormat::Ppm, false),
        "P6" => (ImageFormat::Ppm, true),
        other => {
            return Err(IoError::DecodeError(format!(
                "unsupported PNM magic {other:?}"
            )));
        }
    };
    let width = tokens.number("width")? as usize;
    let height = tokens.number("height")? as usize;
    let maxval = tokens.number("maxval")?;

    if width == 0 || height == 0 {
        return Err(IoError::DecodeError(format!(
            "empty image: {width}x{height}"
        )));
    }
    if maxval == 0 || maxval > 255 {
        return Err(IoError::DecodeError(format!(
            "unsupported maxval {maxval}: expected 1..=255"
        )));
    }

    let samples = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(format.channels()))
        .filter(|&n| n <= MAX_PNM_SAMPLES)
        .ok_or_else(|| {
            IoError::DecodeError(format!(
                "raster {width}x{height} exceeds the {MAX_PNM_SAMPLES}-sample limit"
            ))
        })?;

    Ok(Header {
        format,
        binary,
        width,
        height,
        maxval,
        samples,
    })
}

/// Read a PGM or PPM image from a reader.
///
/// # Arguments
/// * `reader` - A buffered reader positioned at the `P2`/`P3`/`P5`/`P6` magic
///
/// # Returns
/// A one-channel buffer for PGM or a three-channel buffer for PPM, with
/// `rows = height` and `cols = width`.
pub fn read_pnm<R: BufRead>(reader: R) -> IoResult<PixelBuffer> {
    let mut tokens = Tokens { reader };
    let header = read_header(&mut tokens)?;
    let channels = header.format.channels();
    let count = header.samples;

    let mut samples = if header.binary {
        let mut raw = Vec::with_capacity(count.min(INITIAL_RASTER_CAPACITY));
        Read::take(&mut tokens.reader, count as u64).read_to_end(&mut raw)?;
        if raw.len() != count {
            return Err(IoError::DecodeError(format!(
                "truncated raster: {count} samples expected, {} found",
                raw.len()
            )));
        }
        raw
    } else {
        let mut raw = Vec::with_capacity(count.min(INITIAL_RASTER_CAPACITY));
        for _ in 0..count {
            let value = tokens.number("sample")?;
            if value > header.maxval {
                return Err(IoError::DecodeError(format!(
                    "sample {value} exceeds maxval {}",
                    header.maxval
                )));
            }
            raw.push(value as u8);
        }
        raw
    };

    if header.maxval != 255 {
        let maxval = header.maxval;
        for s in samples.iter_mut() {
            *s = ((u32::from(*s).min(maxval) * 255 + maxval / 2) / maxval) as u8;
        }
    }

    log::debug!(
        "decoded {} {}x{} (maxval {}, {})",
        header.format,
        header.width,
        header.height,
        header.maxval,
        if header.binary { "binary" } else { "ascii" }
    );

    Ok(PixelBuffer::from_samples(
        header.height,
        header.width,
        channels,
        samples,
    )?)
}

/// Write a buffer as binary PNM to a writer.
///
/// Chooses P5 for one-channel buffers and P6 for three-channel buffers.
///
/// # Arguments
/// * `buf`    - The image to encode
/// * `writer` - Destination writer
pub fn write_pnm<W: Write>(buf: &PixelBuffer, mut writer: W) -> IoResult<()> {
    let magic = match ImageFormat::for_channels(buf.channels()) {
        Some(ImageFormat::Pgm) => "P5",
        Some(ImageFormat::Ppm) => "P6",
        None => {
            return Err(IoError::DecodeError(format!(
                "cannot encode {} channels as PNM",
                buf.channels()
            )));
        }
    };
    write!(writer, "{magic}\n{} {}\n255\n", buf.cols(), buf.rows())?;
    writer.write_all(buf.samples())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_ascii_pgm_with_comments() {
        let data = b"P2\n# a comment\n3 2\n# another\n255\n0 1 2\n253 254 255\n";
        let buf = read_pnm(Cursor::new(&data[..])).unwrap();
        assert_eq!(buf.shape(), (2, 3, 1));
        assert_eq!(buf.samples(), &[0, 1, 2, 253, 254, 255]);
    }

    #[test]
    fn test_read_binary_ppm() {
        let mut data = b"P6\n2 1\n255\n".to_vec();
        data.extend_from_slice(&[10, 20, 30, 40, 50, 60]);
        let buf = read_pnm(Cursor::new(data)).unwrap();
        assert_eq!(buf.shape(), (1, 2, 3));
        assert_eq!(buf.get(0, 1, 2).unwrap(), 60);
    }

    #[test]
    fn test_binary_sample_may_look_like_whitespace() {
        let mut data = b"P5 2 1 255\n".to_vec();
        data.extend_from_slice(&[b' ', b'#']);
        let buf = read_pnm(Cursor::new(data)).unwrap();
        assert_eq!(buf.samples(), &[b' ', b'#']);
    }

    #[test]
    fn test_maxval_rescaled() {
        let data = b"P2\n2 1\n15\n0 15\n";
        let buf = read_pnm(Cursor::new(&data[..])).unwrap();
        assert_eq!(buf.samples(), &[0, 255]);
    }

    #[test]
    fn test_rejects_bad_headers() {
        assert!(read_pnm(Cursor::new(&b"P4\n1 1\n"[..])).is_err());
        assert!(read_pnm(Cursor::new(&b"P5\n0 3\n255\n"[..])).is_err());
        assert!(read_pnm(Cursor::new(&b"P5\n1 1\n65535\n\0\0"[..])).is_err());
        assert!(read_pnm(Cursor::new(&b"P5\n2 2\n255\n\0"[..])).is_err());
        assert!(read_pnm(Cursor::new(&b""[..])).is_err());
    }

    #[test]
    fn test_rejects_oversized_headers() {
        let data = b"P6\n4294967295 4294967295\n255\n\0\0\0";
        assert!(matches!(
            read_pnm(Cursor::new(&data[..])),
            Err(IoError::DecodeError(_))
        ));
        let data = b"P5\n20000 20000\n255\n\0";
        assert!(matches!(
            read_pnm(Cursor::new(&data[..])),
            Err(IoError::DecodeError(_))
        ));
    }

    #[test]
    fn test_write_header() {
        let buf = PixelBuffer::from_samples(2, 3, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let mut out = Vec::new();
        write_pnm(&buf, &mut out).unwrap();
        assert!(out.starts_with(b"P5\n3 2\n255\n"));
        assert_eq!(&out[out.len() - 6..], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(read_pnm(Cursor::new(out)).unwrap(), buf);
    }
}
