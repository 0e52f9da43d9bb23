//! Radial frequency masks
//!
//! Masks are laid out for a centered spectrum: distance is measured from
//! `(rows / 2, cols / 2)`, where [`SpectralPlane::quadrant_shift`] puts
//! the zero frequency.
//!
//! [`SpectralPlane::quadrant_shift`]: super::SpectralPlane::quadrant_shift

use crate::{FilterError, FilterResult};
use std::fmt;

/// Radial filter shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Keep frequencies within the inner radius
    LowPass,
    /// Drop frequencies within the inner radius
    HighPass,
    /// Drop frequencies between the inner and outer radius
    BandStop,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterKind::LowPass => "low-pass",
            FilterKind::HighPass => "high-pass",
            FilterKind::BandStop => "band-stop",
        })
    }
}

fn radial(rows: usize, cols: usize, keep: impl Fn(f32) -> bool) -> Vec<f32> {
    let cy = (rows / 2) as f32;
    let cx = (cols / 2) as f32;
    let mut mask = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let d = (r as f32 - cy).hypot(c as f32 - cx);
            mask.push(if keep(d) { 1.0 } else { 0.0 });
        }
    }
    mask
}

/// 1 where the distance to the center is at most `radius`, else 0.
pub fn low_pass(rows: usize, cols: usize, radius: f32) -> Vec<f32> {
    radial(rows, cols, |d| d <= radius)
}

/// Complement of [`low_pass`].
pub fn high_pass(rows: usize, cols: usize, radius: f32) -> Vec<f32> {
    radial(rows, cols, |d| d > radius)
}

/// 0 where `inner <= distance <= outer`, else 1.
///
/// # Errors
///
/// Returns [`FilterError::InvalidArgument`] unless `inner < outer`.
pub fn band_stop(rows: usize, cols: usize, inner: f32, outer: f32) -> FilterResult<Vec<f32>> {
    if outer <= inner {
        return Err(FilterError::InvalidArgument(format!(
            "band-stop outer radius {outer} must exceed inner radius {inner}"
        )));
    }
    Ok(radial(rows, cols, |d| d < inner || d > outer))
}

/// Mask for `kind`. `outer` is only read by [`FilterKind::BandStop`].
pub fn build(kind: FilterKind, rows: usize, cols: usize, inner: f32, outer: f32) -> FilterResult<Vec<f32>> {
    match kind {
        FilterKind::LowPass => Ok(low_pass(rows, cols, inner)),
        FilterKind::HighPass => Ok(high_pass(rows, cols, inner)),
        FilterKind::BandStop => band_stop(rows, cols, inner, outer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_pass_radius_zero_keeps_center() {
        let mask = low_pass(8, 8, 0.0);
        assert_eq!(mask.iter().filter(|&&m| m == 1.0).count(), 1);
        assert_eq!(mask[4 * 8 + 4], 1.0);
    }

    #[test]
    fn test_high_pass_is_complement() {
        let lp = low_pass(6, 10, 2.5);
        let hp = high_pass(6, 10, 2.5);
        assert!(lp.iter().zip(&hp).all(|(a, b)| a + b == 1.0));
    }

    #[test]
    fn test_band_stop_ring() {
        let mask = band_stop(8, 8, 1.0, 2.0).unwrap();
        assert_eq!(mask[4 * 8 + 4], 1.0);
        assert_eq!(mask[4 * 8 + 5], 0.0);
        assert_eq!(mask[4 * 8 + 6], 0.0);
        assert_eq!(mask[4 * 8 + 7], 1.0);
        assert!(band_stop(8, 8, 2.0, 2.0).is_err());
        assert!(build(FilterKind::BandStop, 8, 8, 3.0, 1.0).is_err());
    }
}
