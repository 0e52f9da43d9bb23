//! Pixel access functions
//!
//! Bounds-checked getters and setters for single samples and whole
//! channel slabs. Setters clamp to `[0, 255]` and fire the observers.
//!
//! # Bounds tests
//!
//! [`PixelBuffer::is_in_bounds`] is inclusive of the one-past-end row and
//! column. Region placement is validated with it, which lets a region end
//! exactly on the image edge. Sample access always uses the strict
//! `[0, rows) x [0, cols) x [0, channels)` test.

use super::{PixelBuffer, clamp_sample};
use crate::error::{Error, Result};

impl PixelBuffer {
    /// Inclusive placement test: `row <= rows` and `col <= cols`.
    #[inline]
    pub fn is_in_bounds(&self, row: usize, col: usize) -> bool {
        row <= self.rows && col <= self.cols
    }

    /// Inclusive placement test plus a strict channel test.
    #[inline]
    pub fn is_in_bounds_channel(&self, row: usize, col: usize, channel: usize) -> bool {
        self.is_in_bounds(row, col) && channel < self.channels
    }

    #[inline]
    fn index(&self, row: usize, col: usize, channel: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols || channel >= self.channels || self.is_closed() {
            return Err(Error::OutOfBounds {
                row,
                col,
                channel,
                rows: self.rows,
                cols: self.cols,
                channels: self.channels,
            });
        }
        Ok((row * self.cols + col) * self.channels + channel)
    }

    /// Get the sample at `(row, col, channel)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if any index is outside the buffer.
    #[inline]
    pub fn get(&self, row: usize, col: usize, channel: usize) -> Result<u8> {
        let idx = self.index(row, col, channel)?;
        Ok(self.data[idx])
    }

    /// Get a sample of a one-channel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] on a color buffer and
    /// [`Error::OutOfBounds`] for a bad address.
    pub fn get_gray(&self, row: usize, col: usize) -> Result<u8> {
        if self.is_color() {
            return Err(Error::InvalidArgument(
                "two-index access is for one-channel buffers only".into(),
            ));
        }
        self.get(row, col, 0)
    }

    /// Clamp `value` into `[0, 255]`, store it and notify observers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfBounds`] if any index is outside the buffer;
    /// nothing is stored and no observer fires.
    pub fn set(&mut self, row: usize, col: usize, channel: usize, value: i32) -> Result<()> {
        let idx = self.index(row, col, channel)?;
        self.data[idx] = clamp_sample(value);
        self.notify();
        Ok(())
    }

    /// Set a sample of a one-channel buffer.
    pub fn set_gray(&mut self, row: usize, col: usize, value: i32) -> Result<()> {
        if self.is_color() {
            return Err(Error::InvalidArgument(
                "two-index access is for one-channel buffers only".into(),
            ));
        }
        self.set(row, col, 0, value)
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels {
            return Err(Error::InvalidArgument(format!(
                "invalid channel index {channel}: the buffer has {} channels",
                self.channels
            )));
        }
        Ok(())
    }

    /// Copy one channel out as a row-major `rows * cols` vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> Result<Vec<u8>> {
        self.check_channel(channel)?;
        Ok(self
            .data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .copied()
            .collect())
    }

    /// Overwrite one channel from a row-major slab, clamping each value.
    ///
    /// Observers fire once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `channel` is out of range or
    /// `values.len() != rows * cols`.
    pub fn set_channel(&mut self, channel: usize, values: &[i32]) -> Result<()> {
        self.check_channel(channel)?;
        if values.len() != self.pixel_count() {
            return Err(Error::InvalidArgument(format!(
                "invalid channel data length {}: the buffer has {} pixels",
                values.len(),
                self.pixel_count()
            )));
        }
        let step = self.channels;
        for (sample, &value) in self
            .data
            .iter_mut()
            .skip(channel)
            .step_by(step)
            .zip(values)
        {
            *sample = clamp_sample(value);
        }
        self.notify();
        Ok(())
    }
}
