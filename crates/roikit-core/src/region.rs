//! Region - rectangular working copy of a source buffer
//!
//! A [`Region`] copies a rectangle of its source [`PixelBuffer`] into an
//! owned region buffer. Engines and point operations mutate that copy;
//! the source only changes when [`Region::commit`] writes the copy back.
//!
//! Coordinates follow the buffer convention: `x` indexes rows and `y`
//! indexes columns.
//!
//! # Examples
//!
//! ```
//! use roikit_core::{PixelBuffer, Region};
//!
//! let mut image = PixelBuffer::new(8, 8, 1).unwrap();
//! let mut region = Region::new(&mut image, 2, 2, 4, 4).unwrap();
//! region.buffer_mut().set(0, 0, 0, 200).unwrap();
//! region.commit().unwrap();
//! assert_eq!(image.get(2, 2, 0).unwrap(), 200);
//! ```

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};

/// Rectangular, committable copy of part of a source buffer
pub struct Region<'a> {
    source: &'a mut PixelBuffer,
    start_x: usize,
    start_y: usize,
    total_x: usize,
    total_y: usize,
    buffer: PixelBuffer,
}

impl<'a> Region<'a> {
    /// Copy the `total_x x total_y` rectangle at `(start_x, start_y)` out
    /// of `source`.
    ///
    /// Placement is validated with the inclusive
    /// [`PixelBuffer::is_in_bounds`] test, so a region may end exactly on
    /// the last row or column.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if the source has been closed
    /// - [`Error::RoiOutOfBounds`] if either corner lies outside the source
    /// - [`Error::InvalidDimension`] for a zero extent
    pub fn new(
        source: &'a mut PixelBuffer,
        start_x: usize,
        start_y: usize,
        total_x: usize,
        total_y: usize,
    ) -> Result<Self> {
        if source.is_closed() {
            return Err(Error::InvalidArgument(
                "cannot extract a region from a closed buffer".to_string(),
            ));
        }
        let end_x = start_x.saturating_add(total_x);
        let end_y = start_y.saturating_add(total_y);
        if !source.is_in_bounds(start_x, start_y) || !source.is_in_bounds(end_x, end_y) {
            return Err(Error::RoiOutOfBounds {
                start_x,
                start_y,
                end_x,
                end_y,
                rows: source.rows(),
                cols: source.cols(),
            });
        }

        let channels = source.channels();
        let mut samples = Vec::with_capacity(total_x * total_y * channels);
        let src = source.samples();
        let src_cols = source.cols();
        for i in 0..total_x {
            let row_start = ((start_x + i) * src_cols + start_y) * channels;
            samples.extend_from_slice(&src[row_start..row_start + total_y * channels]);
        }
        let buffer = PixelBuffer::from_samples(total_x, total_y, channels, samples)?;

        log::debug!(
            "region extracted: ({start_x}, {start_y}) {total_x}x{total_y}x{channels}"
        );

        Ok(Region {
            source,
            start_x,
            start_y,
            total_x,
            total_y,
            buffer,
        })
    }

    /// Require a square region when `flag` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `flag` is set and the extents
    /// differ.
    pub fn enforce_square(&self, flag: bool) -> Result<()> {
        if flag && self.total_x != self.total_y {
            return Err(Error::InvalidArgument(format!(
                "region must be square, got {}x{}",
                self.total_x, self.total_y
            )));
        }
        Ok(())
    }

    /// Require power-of-two extents when `flag` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `flag` is set and an extent is
    /// not a power of two.
    pub fn enforce_base_two(&self, flag: bool) -> Result<()> {
        let base_two = |n: usize| n & (n - 1) == 0;
        if flag && !(base_two(self.total_x) && base_two(self.total_y)) {
            return Err(Error::InvalidArgument(format!(
                "region must be 2^n x 2^n, got {}x{}",
                self.total_x, self.total_y
            )));
        }
        Ok(())
    }

    /// Write the region buffer back into the source at the original offset.
    ///
    /// Consumes the region. Every sample goes through
    /// [`PixelBuffer::set`], so the source's own observers fire.
    pub fn commit(self) -> Result<()> {
        let channels = self.buffer.channels();
        for i in 0..self.total_x {
            for j in 0..self.total_y {
                for k in 0..channels {
                    let value = self.buffer.get(i, j, k)?;
                    self.source
                        .set(self.start_x + i, self.start_y + j, k, i32::from(value))?;
                }
            }
        }
        log::debug!(
            "region committed: ({}, {}) {}x{}",
            self.start_x,
            self.start_y,
            self.total_x,
            self.total_y
        );
        Ok(())
    }

    #[inline]
    pub fn start_x(&self) -> usize {
        self.start_x
    }

    #[inline]
    pub fn start_y(&self) -> usize {
        self.start_y
    }

    #[inline]
    pub fn total_x(&self) -> usize {
        self.total_x
    }

    #[inline]
    pub fn total_y(&self) -> usize {
        self.total_y
    }

    /// One past the last source row covered by the region.
    #[inline]
    pub fn end_x(&self) -> usize {
        self.start_x + self.total_x
    }

    /// One past the last source column covered by the region.
    #[inline]
    pub fn end_y(&self) -> usize {
        self.start_y + self.total_y
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.buffer.channels()
    }

    /// The owned region buffer.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Mutable access to the region buffer. The source is not affected
    /// until [`commit`](Self::commit).
    pub fn buffer_mut(&mut self) -> &mut PixelBuffer {
        &mut self.buffer
    }

    /// Read-only view of the source buffer.
    pub fn source(&self) -> &PixelBuffer {
        self.source
    }
}

impl std::fmt::Debug for Region<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Region")
            .field("start_x", &self.start_x)
            .field("start_y", &self.start_y)
            .field("total_x", &self.total_x)
            .field("total_y", &self.total_y)
            .field("channels", &self.buffer.channels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize, channels: usize) -> PixelBuffer {
        let samples = (0..rows * cols * channels).map(|v| (v % 256) as u8).collect();
        PixelBuffer::from_samples(rows, cols, channels, samples).unwrap()
    }

    #[test]
    fn test_extract_copies_rectangle() {
        let mut image = ramp(6, 7, 3);
        let expected = image.get(3, 4, 2).unwrap();
        let region = Region::new(&mut image, 2, 1, 3, 4).unwrap();
        assert_eq!(region.buffer().shape(), (3, 4, 3));
        assert_eq!(region.buffer().get(1, 3, 2).unwrap(), expected);
        assert_eq!((region.end_x(), region.end_y()), (5, 5));
    }

    #[test]
    fn test_extract_commit_identity() {
        let mut image = ramp(5, 5, 1);
        let before = image.duplicate();
        let region = Region::new(&mut image, 1, 1, 3, 3).unwrap();
        region.commit().unwrap();
        assert_eq!(image, before);
    }

    #[test]
    fn test_region_may_end_on_edge() {
        let mut image = ramp(4, 4, 1);
        let region = Region::new(&mut image, 2, 2, 2, 2).unwrap();
        assert_eq!(region.buffer().get(1, 1, 0).unwrap(), 15);
    }

    #[test]
    fn test_out_of_bounds_placement() {
        let mut image = PixelBuffer::new(4, 4, 1).unwrap();
        assert!(matches!(
            Region::new(&mut image, 3, 0, 2, 2),
            Err(Error::RoiOutOfBounds { .. })
        ));
        assert!(matches!(
            Region::new(&mut image, 5, 0, 0, 1),
            Err(Error::RoiOutOfBounds { .. })
        ));
        assert!(matches!(
            Region::new(&mut image, 0, 0, 0, 2),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_region_edits_stay_local_until_commit() {
        let mut image = PixelBuffer::new(4, 4, 1).unwrap();
        {
            let mut region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
            region.buffer_mut().set(0, 0, 0, 99).unwrap();
            assert_eq!(region.source().get(0, 0, 0).unwrap(), 0);
        }
        assert_eq!(image.get(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_enforce_square_and_base_two() {
        let mut image = PixelBuffer::new(16, 16, 1).unwrap();
        let region = Region::new(&mut image, 0, 0, 8, 4).unwrap();
        assert!(region.enforce_square(false).is_ok());
        assert!(matches!(
            region.enforce_square(true),
            Err(Error::InvalidArgument(_))
        ));
        assert!(region.enforce_base_two(true).is_ok());

        let region = Region::new(&mut image, 0, 0, 6, 6).unwrap();
        assert!(region.enforce_square(true).is_ok());
        assert!(region.enforce_base_two(true).is_err());
        assert!(region.enforce_base_two(false).is_ok());
    }

    #[test]
    fn test_commit_fires_source_observers() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut image = PixelBuffer::new(3, 3, 1).unwrap();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        image.add_observer(move |_| h.set(h.get() + 1));
        let region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
        region.commit().unwrap();
        assert_eq!(hits.get(), 4);
    }
}
