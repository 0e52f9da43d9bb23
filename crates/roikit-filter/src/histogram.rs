//! Histogram operations on a region
//!
//! [`HistogramBin`] groups the coordinates of a region by intensity, one
//! bucket per representable value of each channel. [`HistogramEngine`]
//! keeps a bin current by subscribing to the region buffer and drives
//! three contrast operations off it:
//!
//! - classical equalization of one channel or all channels
//! - linear stretching with a fixed 5% trim of the occupied range
//! - equalization restricted to the samples below a threshold
//!
//! Each operation records a histogram snapshot before and after.
//!
//! # Color spaces
//!
//! In hsv mode the engine converts the region to hue/saturation/value for
//! binning and for every operation, then converts the result back before
//! writing it into the region buffer. The hue channel only spans
//! `0..=179`.

use crate::snapshot::{Snapshot, SnapshotKind};
use crate::{FilterError, FilterResult};
use roikit_color::{ColorSpace, buffer_hsv_to_rgb, buffer_rgb_to_hsv};
use roikit_core::{ObserverId, PixelBuffer, Region};
use std::cell::{Ref, RefCell};
use std::rc::Rc;

/// Side of the square histogram snapshot
pub const HISTOGRAM_IMAGE_SIZE: usize = 256;

/// Lower trim applied to the lowest occupied intensity by a stretch
const STRETCH_LOW_TRIM: f64 = 1.05;

/// Upper trim applied to the highest occupied intensity by a stretch
const STRETCH_HIGH_TRIM: f64 = 0.95;

/// Region coordinates `(x, y)`: row, column
pub type Coord = (usize, usize);

/// Coordinates of a region grouped by channel and intensity
///
/// For every channel the buckets partition the region: each coordinate
/// appears in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistogramBin {
    color_space: ColorSpace,
    channels: Vec<Vec<Vec<Coord>>>,
}

impl HistogramBin {
    /// Bin every pixel of `buf` in `color_space`.
    ///
    /// # Errors
    ///
    /// Returns a color error if `color_space` is hsv and `buf` does not
    /// have three channels.
    pub fn compute(buf: &PixelBuffer, color_space: ColorSpace) -> FilterResult<Self> {
        match color_space {
            ColorSpace::Rgb => Ok(Self::fill(buf, color_space)),
            ColorSpace::Hsv => {
                let hsv = buffer_rgb_to_hsv(buf)?;
                Ok(Self::fill(&hsv, color_space))
            }
        }
    }

    fn fill(buf: &PixelBuffer, color_space: ColorSpace) -> Self {
        let nch = buf.channels();
        let mut channels: Vec<Vec<Vec<Coord>>> = (0..nch)
            .map(|k| vec![Vec::new(); color_space.channel_max(k) as usize + 1])
            .collect();

        let cols = buf.cols();
        for (idx, px) in buf.samples().chunks_exact(nch).enumerate() {
            let coord = (idx / cols, idx % cols);
            for (k, &value) in px.iter().enumerate() {
                // hsv conversion never yields a hue above 179
                let top = channels[k].len() - 1;
                channels[k][(value as usize).min(top)].push(coord);
            }
        }

        HistogramBin {
            color_space,
            channels,
        }
    }

    /// Color space the bin was computed in.
    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Number of binned channels.
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Coordinates with `intensity` on `channel`. Empty when either index
    /// is out of range.
    pub fn bucket(&self, channel: usize, intensity: usize) -> &[Coord] {
        self.channels
            .get(channel)
            .and_then(|c| c.get(intensity))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Bucket sizes of `channel`, indexed by intensity.
    pub fn bucket_sizes(&self, channel: usize) -> Vec<usize> {
        self.channels
            .get(channel)
            .map(|c| c.iter().map(Vec::len).collect())
            .unwrap_or_default()
    }

    /// Total number of coordinates binned on `channel`.
    pub fn count(&self, channel: usize) -> usize {
        self.bucket_sizes(channel).iter().sum()
    }

    /// Lowest intensity with a non-empty bucket.
    pub fn lowest_nonempty(&self, channel: usize) -> Option<usize> {
        self.channels.get(channel)?.iter().position(|b| !b.is_empty())
    }

    /// Highest intensity with a non-empty bucket.
    pub fn highest_nonempty(&self, channel: usize) -> Option<usize> {
        self.channels.get(channel)?.iter().rposition(|b| !b.is_empty())
    }
}

/// Classical histogram equalization of a sample population onto
/// `0..=max`.
///
/// With `h` the histogram, `i0` the lowest occupied value and `n` the
/// population size, value `i` maps to
/// `round((cdf(i) - h[i0]) * max / (n - h[i0]))`. A population holding a
/// single value is returned unchanged.
pub fn equalize_samples(samples: &[u8], max: u8) -> Vec<u8> {
    let mut hist = [0usize; 256];
    for &s in samples {
        hist[s as usize] += 1;
    }
    let total = samples.len();
    let Some(i0) = hist.iter().position(|&h| h > 0) else {
        return Vec::new();
    };
    if hist[i0] == total {
        return samples.to_vec();
    }

    let scale = max as f64 / (total - hist[i0]) as f64;
    let mut lut = [0u8; 256];
    let mut sum = 0usize;
    for i in (i0 + 1)..256 {
        sum += hist[i];
        lut[i] = ((sum as f64 * scale).round() as i64).clamp(0, max as i64) as u8;
    }

    samples.iter().map(|&s| lut[s as usize]).collect()
}

/// Render the bar histogram of one channel of `bin`.
///
/// The image is `256 x 256`, one column per intensity. Bar height is the
/// bucket size interpolated between the smallest and largest non-empty
/// buckets; empty buckets and intensities above the channel maximum draw
/// no bar. When all non-empty buckets have the same size every bar is
/// full height.
pub fn channel_histogram_image(bin: &HistogramBin, channel: usize) -> FilterResult<PixelBuffer> {
    let sizes = bin.bucket_sizes(channel);
    let occupied = || sizes.iter().copied().filter(|&s| s > 0);
    let min = occupied().min().unwrap_or(0) as f32;
    let max = occupied().max().unwrap_or(0) as f32;

    let side = HISTOGRAM_IMAGE_SIZE;
    let top = (side - 1) as f32;
    let mut image = vec![0u8; side * side];
    for j in 0..side {
        let size = sizes.get(j).copied().unwrap_or(0);
        if size == 0 {
            continue;
        }
        let ratio = if max > min {
            (size as f32 - min) / (max - min)
        } else {
            1.0
        };
        let cutoff = top - top * ratio;
        for i in 0..side {
            if i as f32 >= cutoff {
                image[i * side + j] = 255;
            }
        }
    }

    Ok(PixelBuffer::from_samples(side, side, 1, image)?)
}

/// Contrast operations over a region, backed by a live [`HistogramBin`]
///
/// The engine borrows the region exclusively; dropping it removes its
/// observer from the region buffer.
///
/// # Examples
///
/// ```
/// use roikit_core::{PixelBuffer, Region};
/// use roikit_filter::HistogramEngine;
///
/// let mut image = PixelBuffer::new(4, 4, 1).unwrap();
/// image.set(0, 0, 0, 200).unwrap();
/// let mut region = Region::new(&mut image, 0, 0, 4, 4).unwrap();
/// let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
/// engine.perform_equalization(0).unwrap();
/// assert_eq!(engine.bin().bucket(0, 255).len(), 1);
/// ```
pub struct HistogramEngine<'r, 'a> {
    region: &'r mut Region<'a>,
    color_space: ColorSpace,
    bin: Rc<RefCell<HistogramBin>>,
    observer: Option<ObserverId>,
    snapshots: Vec<Snapshot>,
}

impl<'r, 'a> HistogramEngine<'r, 'a> {
    /// Bin `region` in the named color space and subscribe to its buffer.
    ///
    /// # Errors
    ///
    /// - [`roikit_color::ColorError::IllegalColorspace`] for names other
    ///   than "rgb" and "hsv"
    /// - [`FilterError::InvalidArgument`] for hsv on a one-channel region
    pub fn new(region: &'r mut Region<'a>, color_space: &str) -> FilterResult<Self> {
        let color_space = ColorSpace::parse(color_space)?;
        Self::with_color_space(region, color_space)
    }

    /// Same as [`new`](Self::new) with an already parsed color space.
    pub fn with_color_space(region: &'r mut Region<'a>, color_space: ColorSpace) -> FilterResult<Self> {
        if color_space == ColorSpace::Hsv && region.channels() != 3 {
            return Err(FilterError::InvalidArgument(format!(
                "hsv requires a three-channel region, got {} channel(s)",
                region.channels()
            )));
        }

        let bin = Rc::new(RefCell::new(HistogramBin::compute(
            region.buffer(),
            color_space,
        )?));
        let shared = Rc::clone(&bin);
        let observer = region.buffer_mut().add_observer(move |buf| {
            match HistogramBin::compute(buf, color_space) {
                Ok(fresh) => *shared.borrow_mut() = fresh,
                Err(e) => log::warn!("histogram bin not recomputed: {e}"),
            }
        });
        log::debug!(
            "histogram engine ready: {color_space}, {}x{}x{}",
            region.total_x(),
            region.total_y(),
            region.channels()
        );

        Ok(Self {
            region,
            color_space,
            bin,
            observer: Some(observer),
            snapshots: Vec::new(),
        })
    }

    /// Current bin; always reflects the latest region contents.
    pub fn bin(&self) -> Ref<'_, HistogramBin> {
        self.bin.borrow()
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    /// Largest intensity of `channel` in the engine's color space.
    pub fn channel_max(&self, channel: usize) -> u8 {
        self.color_space.channel_max(channel)
    }

    /// The region being operated on.
    pub fn region(&self) -> &Region<'a> {
        self.region
    }

    /// Drain the snapshots recorded so far.
    pub fn take_snapshots(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.snapshots)
    }

    /// Render the bar histogram of `channel` from the current bin.
    pub fn channel_histogram_image(&self, channel: usize) -> FilterResult<PixelBuffer> {
        channel_histogram_image(&self.bin.borrow(), channel)
    }

    /// Release the bin and unsubscribe from the region buffer.
    pub fn close(self) {}

    fn validate_channel(&self, channel: usize) -> FilterResult<()> {
        let channels = self.bin.borrow().channels();
        if channel >= channels {
            return Err(FilterError::InvalidArgument(format!(
                "channel {channel} out of range: the region has {channels} channel(s)"
            )));
        }
        Ok(())
    }

    fn snapshot(&mut self, kind: SnapshotKind, channel: usize) -> FilterResult<()> {
        let image = self.channel_histogram_image(channel)?;
        self.snapshots.push(Snapshot::new(kind, channel, image));
        Ok(())
    }

    /// Scratch copy of the region in the engine's color space.
    fn working_copy(&self) -> FilterResult<PixelBuffer> {
        match self.color_space {
            ColorSpace::Rgb => Ok(self.region.buffer().duplicate()),
            ColorSpace::Hsv => Ok(buffer_rgb_to_hsv(self.region.buffer())?),
        }
    }

    /// Write a scratch copy back into the region; the bin recomputes.
    fn write_back(&mut self, work: PixelBuffer) -> FilterResult<()> {
        let result = match self.color_space {
            ColorSpace::Rgb => work,
            ColorSpace::Hsv => buffer_hsv_to_rgb(&work)?,
        };
        self.region.buffer_mut().deep_copy(&result)?;
        Ok(())
    }

    /// Equalize one channel.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if `channel` is out of
    /// range.
    pub fn perform_equalization(&mut self, channel: usize) -> FilterResult<()> {
        self.validate_channel(channel)?;
        self.snapshot(SnapshotKind::HistogramBefore, channel)?;

        let mut work = self.working_copy()?;
        let values = work.channel(channel)?;
        let equalized: Vec<i32> = equalize_samples(&values, self.channel_max(channel))
            .into_iter()
            .map(i32::from)
            .collect();
        work.set_channel(channel, &equalized)?;
        self.write_back(work)?;

        log::debug!("equalized channel {channel} ({})", self.color_space);
        self.snapshot(SnapshotKind::HistogramAfter, channel)
    }

    /// Equalize every channel in turn.
    pub fn perform_equalization_all(&mut self) -> FilterResult<()> {
        let channels = self.bin.borrow().channels();
        for channel in 0..channels {
            self.perform_equalization(channel)?;
        }
        Ok(())
    }

    /// Stretch the occupied range of one channel onto
    /// `[min_stretch, max_stretch]`.
    ///
    /// With `lo`/`hi` the lowest and highest occupied intensities, the
    /// trimmed range is `new_lo = floor(lo * 1.05)` to
    /// `new_hi = floor(hi * 0.95)`. Intensities below `new_lo` collapse to
    /// `new_lo`, intensities at or above `new_hi` collapse to `new_hi`, and
    /// the rest map linearly onto `[min_stretch, max_stretch]`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if `channel` is out of
    /// range, a bound lies outside `[0, channel_max]`, or
    /// `min_stretch >= max_stretch`.
    pub fn perform_stretch(&mut self, min_stretch: i32, max_stretch: i32, channel: usize) -> FilterResult<()> {
        self.validate_channel(channel)?;
        let top = self.channel_max(channel) as i32;
        if !(0..=top).contains(&min_stretch) || !(0..=top).contains(&max_stretch) {
            return Err(FilterError::InvalidArgument(format!(
                "stretch bounds must lie in 0..={top}, got {min_stretch}..{max_stretch}"
            )));
        }
        if min_stretch >= max_stretch {
            return Err(FilterError::InvalidArgument(format!(
                "min stretch {min_stretch} must be below max stretch {max_stretch}"
            )));
        }

        self.snapshot(SnapshotKind::HistogramBefore, channel)?;

        let mut work = self.working_copy()?;
        {
            let bin = self.bin.borrow();
            let (Some(lo), Some(hi)) = (bin.lowest_nonempty(channel), bin.highest_nonempty(channel))
            else {
                return Ok(());
            };
            let new_lo = ((lo as f64 * STRETCH_LOW_TRIM).floor() as i32).clamp(0, top);
            let new_hi = ((hi as f64 * STRETCH_HIGH_TRIM).floor() as i32).clamp(0, top);
            log::debug!(
                "stretch channel {channel}: occupied {lo}..={hi}, trimmed {new_lo}..{new_hi}"
            );

            let span = (max_stretch - min_stretch) as f64;
            for intensity in lo..=hi {
                let i = intensity as i32;
                let mapped = if i < new_lo {
                    new_lo
                } else if i >= new_hi {
                    new_hi
                } else {
                    let t = (i - new_lo) as f64 * span / (new_hi - new_lo) as f64;
                    ((t + min_stretch as f64).round() as i32).clamp(0, top)
                };
                for &(x, y) in bin.bucket(channel, intensity) {
                    work.set(x, y, channel, mapped)?;
                }
            }
        }
        self.write_back(work)?;

        self.snapshot(SnapshotKind::HistogramAfter, channel)
    }

    /// Stretch every channel in turn.
    pub fn perform_stretch_all(&mut self, min_stretch: i32, max_stretch: i32) -> FilterResult<()> {
        let channels = self.bin.borrow().channels();
        for channel in 0..channels {
            self.perform_stretch(min_stretch, max_stretch, channel)?;
        }
        Ok(())
    }

    /// Equalize only the samples of `channel` below `threshold`.
    ///
    /// The dark population is equalized on its own onto
    /// `0..=channel_max`; samples at or above `threshold` are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if `channel` is out of
    /// range or `threshold` lies outside `[0, channel_max]`.
    pub fn perform_threshold_equalization(&mut self, threshold: i32, channel: usize) -> FilterResult<()> {
        self.validate_channel(channel)?;
        let top = self.channel_max(channel) as i32;
        if !(0..=top).contains(&threshold) {
            return Err(FilterError::InvalidArgument(format!(
                "threshold must lie in 0..={top}, got {threshold}"
            )));
        }

        self.snapshot(SnapshotKind::HistogramBefore, channel)?;

        let mut work = self.working_copy()?;
        let (coords, values) = {
            let bin = self.bin.borrow();
            let mut coords = Vec::new();
            let mut values = Vec::new();
            for intensity in 0..threshold as usize {
                for &coord in bin.bucket(channel, intensity) {
                    coords.push(coord);
                    values.push(intensity as u8);
                }
            }
            (coords, values)
        };
        log::debug!(
            "threshold equalization on channel {channel}: {} sample(s) below {threshold}",
            coords.len()
        );

        let equalized = equalize_samples(&values, self.channel_max(channel));
        for (&(x, y), &value) in coords.iter().zip(&equalized) {
            work.set(x, y, channel, i32::from(value))?;
        }
        self.write_back(work)?;

        self.snapshot(SnapshotKind::HistogramAfter, channel)
    }
}

impl Drop for HistogramEngine<'_, '_> {
    fn drop(&mut self) {
        if let Some(id) = self.observer.take() {
            self.region.buffer_mut().remove_observer(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(rows: usize, cols: usize, samples: Vec<u8>) -> PixelBuffer {
        PixelBuffer::from_samples(rows, cols, 1, samples).unwrap()
    }

    #[test]
    fn test_bin_partitions_region() {
        let buf = PixelBuffer::from_samples(2, 3, 3, (0..18).map(|v| v * 13).collect()).unwrap();
        let bin = HistogramBin::compute(&buf, ColorSpace::Rgb).unwrap();
        for k in 0..3 {
            assert_eq!(bin.count(k), 6);
            assert_eq!(bin.bucket_sizes(k).len(), 256);
        }
        assert_eq!(bin.bucket(0, 0), &[(0, 0)]);
        assert_eq!(bin.bucket(1, 13), &[(0, 0)]);
        assert!(bin.bucket(5, 0).is_empty());
    }

    #[test]
    fn test_hsv_bin_has_short_hue_range() {
        let buf = PixelBuffer::from_samples(1, 2, 3, vec![0, 0, 255, 255, 0, 0]).unwrap();
        let bin = HistogramBin::compute(&buf, ColorSpace::Hsv).unwrap();
        assert_eq!(bin.bucket_sizes(0).len(), 180);
        assert_eq!(bin.bucket(0, 120), &[(0, 0)]);
        assert_eq!(bin.bucket(0, 0), &[(0, 1)]);
        assert_eq!(bin.bucket(2, 255).len(), 2);
    }

    #[test]
    fn test_equalize_samples() {
        assert_eq!(equalize_samples(&[7, 7, 7], 255), vec![7, 7, 7]);
        assert_eq!(equalize_samples(&[10, 20], 255), vec![0, 255]);
        assert_eq!(equalize_samples(&[0, 50, 50, 100], 255), vec![0, 170, 170, 255]);
        assert_eq!(equalize_samples(&[10, 20], 179), vec![0, 179]);
        assert!(equalize_samples(&[], 255).is_empty());
    }

    #[test]
    fn test_histogram_image_bars() {
        // Buckets: 0 -> 1 sample, 10 -> 3 samples
        let buf = gray(2, 2, vec![0, 10, 10, 10]);
        let bin = HistogramBin::compute(&buf, ColorSpace::Rgb).unwrap();
        let img = channel_histogram_image(&bin, 0).unwrap();
        assert_eq!(img.shape(), (256, 256, 1));
        // Smallest bucket: ratio 0, only the bottom row is lit
        assert_eq!(img.get(255, 0, 0).unwrap(), 255);
        assert_eq!(img.get(254, 0, 0).unwrap(), 0);
        // Largest bucket: full height
        assert_eq!(img.get(0, 10, 0).unwrap(), 255);
        // Empty bucket: no bar
        assert_eq!(img.get(255, 5, 0).unwrap(), 0);
    }

    #[test]
    fn test_histogram_image_equal_buckets_full_height() {
        let buf = gray(1, 2, vec![3, 200]);
        let bin = HistogramBin::compute(&buf, ColorSpace::Rgb).unwrap();
        let img = channel_histogram_image(&bin, 0).unwrap();
        assert_eq!(img.get(0, 3, 0).unwrap(), 255);
        assert_eq!(img.get(0, 200, 0).unwrap(), 255);
        assert_eq!(img.get(255, 4, 0).unwrap(), 0);
    }

    #[test]
    fn test_engine_tracks_region_edits() {
        let mut image = gray(2, 2, vec![5, 5, 5, 5]);
        let mut region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
        {
            let engine = HistogramEngine::new(&mut region, "RGB").unwrap();
            assert_eq!(engine.bin().bucket(0, 5).len(), 4);
        }
        assert_eq!(region.buffer().observer_count(), 0);

        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_stretch(0, 100, 0).unwrap();
        assert_eq!(engine.bin().count(0), 4);
    }

    #[test]
    fn test_engine_rejects_bad_arguments() {
        let mut image = gray(2, 2, vec![0, 1, 2, 3]);
        let mut region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
        assert!(matches!(
            HistogramEngine::new(&mut region, "lab"),
            Err(FilterError::Color(_))
        ));
        assert!(matches!(
            HistogramEngine::new(&mut region, "hsv"),
            Err(FilterError::InvalidArgument(_))
        ));

        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        assert!(engine.perform_equalization(1).is_err());
        assert!(engine.perform_stretch(10, 10, 0).is_err());
        assert!(engine.perform_stretch(-1, 10, 0).is_err());
        assert!(engine.perform_stretch(0, 256, 0).is_err());
        assert!(engine.perform_threshold_equalization(300, 0).is_err());
        assert!(engine.take_snapshots().is_empty());
    }

    #[test]
    fn test_stretch_mapping() {
        // lo = 20, hi = 200 -> new_lo = 21, new_hi = 190
        let mut image = gray(1, 4, vec![20, 21, 100, 200]);
        let mut region = Region::new(&mut image, 0, 0, 1, 4).unwrap();
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_stretch(0, 255, 0).unwrap();
        let out = engine.region().buffer().channel(0).unwrap();
        // 20 collapses to new_lo, 21 maps to min, 200 collapses to new_hi
        let mid = ((100 - 21) as f64 * 255.0 / 169.0).round() as u8;
        assert_eq!(out, vec![21, 0, mid, 190]);
        assert_eq!(engine.take_snapshots().len(), 2);
    }

    #[test]
    fn test_threshold_equalization_leaves_bright_pixels() {
        let mut image = gray(2, 3, vec![10, 20, 30, 200, 220, 240]);
        let mut region = Region::new(&mut image, 0, 0, 2, 3).unwrap();
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_threshold_equalization(100, 0).unwrap();
        let out = engine.region().buffer().channel(0).unwrap();
        assert_eq!(&out[..3], &[0, 128, 255]);
        assert_eq!(&out[3..], &[200, 220, 240]);
    }

    #[test]
    fn test_hsv_equalization_keeps_hue_in_range() {
        let samples = vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 0, 255,
        ];
        let mut image = PixelBuffer::from_samples(2, 2, 3, samples).unwrap();
        let mut region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
        let mut engine = HistogramEngine::new(&mut region, "hsv").unwrap();
        engine.perform_equalization(0).unwrap();
        assert_eq!(engine.bin().count(0), 4);
        assert_eq!(engine.bin().highest_nonempty(0), Some(179));
    }
}
