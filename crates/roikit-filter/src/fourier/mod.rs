//! Frequency-domain filtering of one region channel
//!
//! [`SpectralFilterEngine`] caches one channel of a square, power-of-two
//! region (in rgb or hsv), filters it through a radial mask in the
//! frequency domain and writes the result back into the region buffer.
//!
//! # Pipeline
//!
//! 1. Forward 2-D DFT of the cached channel, zero-padded to an optimal
//!    size
//! 2. Quadrant shift, so the zero frequency sits at the plane center
//! 3. Multiply by a binary radial mask
//! 4. Shift back, inverse DFT, crop to the region extent
//! 5. Min-max rescale into the channel range and write back
//!
//! The log-magnitude spectrum is captured as a snapshot before masking
//! and after filtering.

mod mask;
mod plane;

pub use mask::{FilterKind, band_stop, high_pass, low_pass};
pub use plane::{SpectralPlane, optimal_dft_size};

use crate::snapshot::{Snapshot, SnapshotKind};
use crate::{FilterError, FilterResult};
use roikit_color::{ColorSpace, buffer_hsv_to_rgb, buffer_rgb_to_hsv};
use roikit_core::{MAX_SAMPLE, PixelBuffer, Region};
use rustfft::FftPlanner;

/// Relative span below which a plane counts as flat
const FLAT_TOLERANCE: f32 = 1e-3;

/// Rescale `values` onto `[0, max]`, rounding to integers.
///
/// A flat plane, whose span is at most `1e-3` of its largest magnitude
/// (or of 1 for planes near zero), is rounded and clamped instead, so a
/// uniform input stays uniform.
///
/// ```
/// use roikit_filter::fourier::normalize_to_range;
///
/// assert_eq!(normalize_to_range(&[-1.0, 0.0, 1.0], 255), vec![0, 128, 255]);
/// assert_eq!(normalize_to_range(&[3.9999, 4.0001], 255), vec![4, 4]);
/// ```
pub fn normalize_to_range(values: &[f32], max: u8) -> Vec<i32> {
    let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
    let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let top = i32::from(max);
    let span = hi - lo;
    let magnitude = lo.abs().max(hi.abs()).max(1.0);

    if span.is_nan() || span <= FLAT_TOLERANCE * magnitude {
        return values
            .iter()
            .map(|&v| (v.round() as i32).clamp(0, top))
            .collect();
    }

    let scale = f32::from(max) / span;
    values
        .iter()
        .map(|&v| (((v - lo) * scale).round() as i32).clamp(0, top))
        .collect()
}

/// Frequency-domain filters over one channel of a region
///
/// The engine borrows the region exclusively and keeps its own copy of
/// the operated channel, refreshed after every applied change so filters
/// compose.
pub struct SpectralFilterEngine<'r, 'a> {
    region: &'r mut Region<'a>,
    color_space: ColorSpace,
    channel: usize,
    operation_channel: Vec<f32>,
    rows: usize,
    cols: usize,
    planner: FftPlanner<f32>,
    snapshots: Vec<Snapshot>,
}

impl<'r, 'a> SpectralFilterEngine<'r, 'a> {
    /// Cache `channel` of `region` in the named color space.
    ///
    /// # Errors
    ///
    /// - [`roikit_color::ColorError::IllegalColorspace`] for names other
    ///   than "rgb" and "hsv"
    /// - [`roikit_core::Error::InvalidArgument`] unless the region is
    ///   square with power-of-two sides
    /// - [`FilterError::InvalidArgument`] for a channel the region (or
    ///   hsv) does not have
    pub fn new(region: &'r mut Region<'a>, color_space: &str, channel: usize) -> FilterResult<Self> {
        let color_space = ColorSpace::parse(color_space)?;
        region.enforce_base_two(true)?;
        region.enforce_square(true)?;

        let channels = region.channels();
        match color_space {
            ColorSpace::Rgb if channel >= channels => {
                return Err(FilterError::InvalidArgument(format!(
                    "channel {channel} out of range: the region has {channels} channel(s)"
                )));
            }
            ColorSpace::Hsv if channels != 3 || channel >= 3 => {
                return Err(FilterError::InvalidArgument(format!(
                    "hsv channel {channel} needs a three-channel region, got {channels} channel(s)"
                )));
            }
            _ => {}
        }

        let rows = region.buffer().rows();
        let cols = region.buffer().cols();
        let mut engine = Self {
            region,
            color_space,
            channel,
            operation_channel: Vec::new(),
            rows,
            cols,
            planner: FftPlanner::new(),
            snapshots: Vec::new(),
        };
        engine.refresh()?;
        log::debug!(
            "spectral engine ready: {color_space} channel {channel}, {rows}x{cols}"
        );
        Ok(engine)
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Largest value of the operated channel.
    pub fn channel_max(&self) -> u8 {
        self.color_space.channel_max(self.channel)
    }

    /// Cached channel, row-major.
    pub fn operation_channel(&self) -> &[f32] {
        &self.operation_channel
    }

    /// The region being operated on.
    pub fn region(&self) -> &Region<'a> {
        self.region
    }

    /// Drain the snapshots recorded so far.
    pub fn take_snapshots(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.snapshots)
    }

    /// Release the cached channel.
    pub fn close(self) {}

    fn refresh(&mut self) -> FilterResult<()> {
        let values = match self.color_space {
            ColorSpace::Rgb => self.region.buffer().channel(self.channel)?,
            ColorSpace::Hsv => buffer_rgb_to_hsv(self.region.buffer())?.channel(self.channel)?,
        };
        self.operation_channel = values.into_iter().map(f32::from).collect();
        Ok(())
    }

    fn spectrum_snapshot(&mut self, kind: SnapshotKind, spectrum: &SpectralPlane, shift: bool) -> FilterResult<()> {
        let mut magnitude = SpectralPlane::from_real(
            &spectrum.log_magnitude(),
            spectrum.rows(),
            spectrum.cols(),
        )?;
        if shift {
            magnitude.quadrant_shift();
        }
        let samples = normalize_to_range(&magnitude.real(), MAX_SAMPLE)
            .into_iter()
            .map(|v| v as u8)
            .collect();
        let image = PixelBuffer::from_samples(spectrum.rows(), spectrum.cols(), 1, samples)?;
        self.snapshots.push(Snapshot::new(kind, self.channel, image));
        Ok(())
    }

    /// Cropped inverse of a filtered plane.
    ///
    /// A uniform channel keeps its level: any mask that drops the DC term
    /// would otherwise leave a flat plane near zero.
    fn reconstructed(&self, filtered: &SpectralPlane) -> Vec<f32> {
        let uniform = self
            .operation_channel
            .split_first()
            .is_some_and(|(first, rest)| rest.iter().all(|v| v == first));
        if uniform {
            log::debug!("uniform channel, level kept");
            return self.operation_channel.clone();
        }
        filtered.crop_real(self.rows, self.cols)
    }

    fn validate_radius(radius: f32) -> FilterResult<()> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(FilterError::InvalidArgument(format!(
                "radius must be a non-negative number, got {radius}"
            )));
        }
        Ok(())
    }

    /// Filter the cached channel through a radial mask and write it back.
    ///
    /// `inner` is the low-pass / high-pass radius and the inner band-stop
    /// radius; `outer` is only read by [`FilterKind::BandStop`].
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] for a negative radius or a
    /// band-stop with `outer <= inner`.
    pub fn apply_filter(&mut self, inner: f32, outer: f32, kind: FilterKind) -> FilterResult<()> {
        Self::validate_radius(inner)?;
        if kind == FilterKind::BandStop {
            Self::validate_radius(outer)?;
            if outer <= inner {
                return Err(FilterError::InvalidArgument(format!(
                    "band-stop outer radius {outer} must exceed inner radius {inner}"
                )));
            }
        }

        let mut spectrum = SpectralPlane::transform(
            &self.operation_channel,
            self.rows,
            self.cols,
            &mut self.planner,
        )?;
        log::debug!(
            "{kind} on {}x{} plane (padded {}x{})",
            self.rows,
            self.cols,
            spectrum.rows(),
            spectrum.cols()
        );
        self.spectrum_snapshot(SnapshotKind::SpectrumBefore, &spectrum, true)?;

        let weights = mask::build(kind, spectrum.rows(), spectrum.cols(), inner, outer)?;
        spectrum.quadrant_shift();
        spectrum.apply_mask(&weights)?;
        spectrum.quadrant_shift();

        let filtered = spectrum.inverse(&mut self.planner);
        self.spectrum_snapshot(SnapshotKind::SpectrumAfter, &spectrum, false)?;

        let values = self.reconstructed(&filtered);
        self.apply_changes(&normalize_to_range(&values, self.channel_max()))
    }

    /// Keep frequencies within `radius` of the center.
    pub fn low_pass(&mut self, radius: f32) -> FilterResult<()> {
        self.apply_filter(radius, 0.0, FilterKind::LowPass)
    }

    /// Drop frequencies within `radius` of the center.
    pub fn high_pass(&mut self, radius: f32) -> FilterResult<()> {
        self.apply_filter(radius, 0.0, FilterKind::HighPass)
    }

    /// Drop frequencies between `inner` and `outer`.
    pub fn band_stop(&mut self, inner: f32, outer: f32) -> FilterResult<()> {
        self.apply_filter(inner, outer, FilterKind::BandStop)
    }

    /// Unsharp masking in the frequency domain.
    ///
    /// The spectrum is split at `radius` into a low band and a high band;
    /// the high band is amplified by `1 + factor` and the two are summed
    /// before the inverse transform.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] for a negative radius or a
    /// factor that is negative or not finite.
    pub fn sharpen_edges(&mut self, radius: f32, factor: f32) -> FilterResult<()> {
        Self::validate_radius(radius)?;
        if !factor.is_finite() || factor < 0.0 {
            return Err(FilterError::InvalidArgument(format!(
                "sharpen factor must be a non-negative number, got {factor}"
            )));
        }

        let spectrum = SpectralPlane::transform(
            &self.operation_channel,
            self.rows,
            self.cols,
            &mut self.planner,
        )?;
        self.spectrum_snapshot(SnapshotKind::SpectrumBefore, &spectrum, true)?;

        let (prows, pcols) = (spectrum.rows(), spectrum.cols());
        let mut centered = spectrum;
        centered.quadrant_shift();

        let mut low = centered.clone();
        low.apply_mask(&low_pass(prows, pcols, radius))?;
        let mut high = centered;
        high.apply_mask(&high_pass(prows, pcols, radius))?;
        high.scale(1.0 + factor);
        low.add(&high)?;
        low.quadrant_shift();

        let sharpened = low.inverse(&mut self.planner);
        self.spectrum_snapshot(SnapshotKind::SpectrumAfter, &low, false)?;
        log::debug!("sharpened at radius {radius} with factor {factor}");

        let values = self.reconstructed(&sharpened);
        self.apply_changes(&normalize_to_range(&values, self.channel_max()))
    }

    /// Write processed channel values back into the region buffer.
    ///
    /// # Errors
    ///
    /// - [`FilterError::PlaneSizeMismatch`] if `values` does not hold one
    ///   value per region pixel
    /// - [`FilterError::ColorRoundTrip`] if the hsv round trip changes the
    ///   buffer shape
    pub fn apply_changes(&mut self, values: &[i32]) -> FilterResult<()> {
        let expected = self.rows * self.cols;
        if values.len() != expected {
            return Err(FilterError::PlaneSizeMismatch {
                expected,
                actual: values.len(),
            });
        }

        match self.color_space {
            ColorSpace::Rgb => {
                self.region.buffer_mut().set_channel(self.channel, values)?;
            }
            ColorSpace::Hsv => {
                let mut hsv = buffer_rgb_to_hsv(self.region.buffer())?;
                let top = i32::from(self.channel_max());
                let clamped: Vec<i32> = values.iter().map(|&v| v.clamp(0, top)).collect();
                hsv.set_channel(self.channel, &clamped)?;
                let rgb = buffer_hsv_to_rgb(&hsv)?;
                if !rgb.same_shape(self.region.buffer()) {
                    return Err(FilterError::ColorRoundTrip {
                        expected: self.region.buffer().shape(),
                        actual: rgb.shape(),
                    });
                }
                self.region.buffer_mut().deep_copy(&rgb)?;
            }
        }
        self.refresh()
    }
}
