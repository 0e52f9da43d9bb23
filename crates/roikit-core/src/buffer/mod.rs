//! PixelBuffer - The main image container
//!
//! A `PixelBuffer` owns a dense `rows x cols x channels` grid of 8-bit
//! samples. It is the only image type in roikit: decoded files, region
//! copies, diagnostic snapshots and color-converted scratch images are all
//! pixel buffers.
//!
//! # Sample layout
//!
//! - Samples are stored row-major, channels interleaved:
//!   index = `(row * cols + col) * channels + channel`
//! - One-channel buffers hold gray levels, three-channel buffers hold
//!   red, green, blue (or hue, saturation, value for converted scratch
//!   buffers)
//! - Every stored sample lies in `[0, 255]`; writes clamp, reads never do
//!
//! # Observers
//!
//! Every successful mutation notifies the registered observers in
//! registration order, before the mutating call returns. See
//! [`observer`] for the subscription API.

mod access;
pub mod observer;

pub use observer::{Observer, ObserverId};

use crate::error::{Error, Result};
use observer::ObserverList;

/// Largest value a sample can hold.
pub const MAX_SAMPLE: u8 = 255;

/// Clamp an arbitrary integer into the sample range.
#[inline]
pub fn clamp_sample(value: i32) -> u8 {
    value.clamp(0, MAX_SAMPLE as i32) as u8
}

/// Dense 8-bit image with change notification
///
/// # Examples
///
/// ```
/// use roikit_core::PixelBuffer;
///
/// let mut buf = PixelBuffer::new(4, 4, 1).unwrap();
/// buf.set(1, 2, 0, 300).unwrap();
/// assert_eq!(buf.get(1, 2, 0).unwrap(), 255);
/// ```
pub struct PixelBuffer {
    rows: usize,
    cols: usize,
    channels: usize,
    data: Vec<u8>,
    observers: ObserverList,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if `rows` or `cols` is 0 or
    /// `channels` is not 1 or 3.
    pub fn new(rows: usize, cols: usize, channels: usize) -> Result<Self> {
        Self::check_shape(rows, cols, channels)?;
        Ok(PixelBuffer {
            rows,
            cols,
            channels,
            data: vec![0; rows * cols * channels],
            observers: ObserverList::default(),
        })
    }

    /// Create a zero-filled one-channel buffer.
    pub fn new_gray(rows: usize, cols: usize) -> Result<Self> {
        Self::new(rows, cols, 1)
    }

    /// Create a buffer that takes ownership of already interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `samples.len()` does not equal
    /// `rows * cols * channels`.
    pub fn from_samples(rows: usize, cols: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        Self::check_shape(rows, cols, channels)?;
        if samples.len() != rows * cols * channels {
            return Err(Error::InvalidArgument(format!(
                "expected {} samples for a {rows}x{cols}x{channels} buffer, got {}",
                rows * cols * channels,
                samples.len()
            )));
        }
        Ok(PixelBuffer {
            rows,
            cols,
            channels,
            data: samples,
            observers: ObserverList::default(),
        })
    }

    fn check_shape(rows: usize, cols: usize, channels: usize) -> Result<()> {
        if rows == 0 || cols == 0 || !(channels == 1 || channels == 3) {
            return Err(Error::InvalidDimension {
                rows,
                cols,
                channels,
            });
        }
        Ok(())
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of channels (1 or 3).
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(rows, cols, channels)`
    #[inline]
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.channels)
    }

    /// Whether the buffer has three channels.
    #[inline]
    pub fn is_color(&self) -> bool {
        self.channels == 3
    }

    /// Number of pixels in one channel.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn samples(&self) -> &[u8] {
        &self.data
    }

    /// Whether two buffers have the same `(rows, cols, channels)`.
    pub fn same_shape(&self, other: &PixelBuffer) -> bool {
        self.shape() == other.shape()
    }

    /// Overwrite every sample with the samples of `other`.
    ///
    /// Observers fire once after the copy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the shapes differ.
    pub fn deep_copy(&mut self, other: &PixelBuffer) -> Result<()> {
        if !self.same_shape(other) {
            return Err(Error::DimensionMismatch {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        self.data.copy_from_slice(&other.data);
        self.notify();
        Ok(())
    }

    /// Copy of the samples and shape, without observers.
    pub fn duplicate(&self) -> PixelBuffer {
        PixelBuffer {
            rows: self.rows,
            cols: self.cols,
            channels: self.channels,
            data: self.data.clone(),
            observers: ObserverList::default(),
        }
    }

    /// Drop every observer and release the grid.
    ///
    /// The shape is kept for reporting, but every later access fails with
    /// [`Error::OutOfBounds`].
    pub fn close(&mut self) {
        self.observers.clear();
        self.data = Vec::new();
    }

    /// Whether [`close`](Self::close) has released the grid.
    pub fn is_closed(&self) -> bool {
        self.data.is_empty()
    }
}

impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl Eq for PixelBuffer {}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("channels", &self.channels)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero_filled() {
        let buf = PixelBuffer::new(3, 5, 3).unwrap();
        assert_eq!(buf.shape(), (3, 5, 3));
        assert!(buf.is_color());
        assert!(buf.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn test_new_invalid_dimensions() {
        assert!(matches!(
            PixelBuffer::new(0, 4, 1),
            Err(Error::InvalidDimension { .. })
        ));
        assert!(PixelBuffer::new(4, 0, 1).is_err());
        assert!(PixelBuffer::new(4, 4, 2).is_err());
        assert!(PixelBuffer::new(4, 4, 4).is_err());
    }

    #[test]
    fn test_from_samples_length_checked() {
        assert!(PixelBuffer::from_samples(2, 2, 1, vec![1, 2, 3, 4]).is_ok());
        assert!(matches!(
            PixelBuffer::from_samples(2, 2, 1, vec![1, 2, 3]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_deep_copy_idempotent() {
        let mut src = PixelBuffer::new(2, 3, 1).unwrap();
        src.set(1, 2, 0, 77).unwrap();
        let mut dst = PixelBuffer::new(2, 3, 1).unwrap();
        dst.deep_copy(&src).unwrap();
        let once = dst.duplicate();
        dst.deep_copy(&src).unwrap();
        assert_eq!(dst, once);
        assert_eq!(dst, src);
    }

    #[test]
    fn test_deep_copy_dimension_mismatch() {
        let src = PixelBuffer::new(2, 3, 3).unwrap();
        let mut dst = PixelBuffer::new(2, 3, 1).unwrap();
        let err = dst.deep_copy(&src).unwrap_err();
        assert_eq!(
            err,
            Error::DimensionMismatch {
                expected: (2, 3, 1),
                actual: (2, 3, 3)
            }
        );
    }

    #[test]
    fn test_equality_ignores_observers() {
        let mut a = PixelBuffer::new(2, 2, 1).unwrap();
        let b = PixelBuffer::new(2, 2, 1).unwrap();
        a.add_observer(|_| {});
        assert_eq!(a, b);
        let c = PixelBuffer::new(2, 2, 3).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_close_releases_grid() {
        let mut buf = PixelBuffer::new(2, 2, 1).unwrap();
        buf.add_observer(|_| {});
        buf.close();
        assert!(buf.is_closed());
        assert_eq!(buf.observer_count(), 0);
        assert!(buf.get(0, 0, 0).is_err());
        assert!(buf.set(0, 0, 0, 1).is_err());
    }
}
