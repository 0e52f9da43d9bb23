//! Point and geometric operations on a region
//!
//! These act on the region buffer only; the source image changes when the
//! caller commits the region. Every operation validates its parameters
//! before touching a sample, so a rejected call leaves the region as it
//! was.

use crate::{FilterError, FilterResult};
use roikit_core::{PixelBuffer, Region};

/// Exclusive bound on the magnitude of an [`add_brightness`] offset
pub const MAX_BRIGHTNESS_STEP: i32 = 50;

fn require_gray(region: &Region<'_>, op: &str) -> FilterResult<()> {
    if region.channels() != 1 {
        return Err(FilterError::InvalidArgument(format!(
            "{op} only works on one-channel regions, got {} channels",
            region.channels()
        )));
    }
    Ok(())
}

fn require_threshold(threshold: i32) -> FilterResult<()> {
    if !(0..=255).contains(&threshold) {
        return Err(FilterError::InvalidArgument(format!(
            "threshold must lie in 0..=255, got {threshold}"
        )));
    }
    Ok(())
}

/// Map every sample of every channel, writing each channel once.
fn map_samples(region: &mut Region<'_>, f: impl Fn(u8) -> i32) -> FilterResult<()> {
    let buf = region.buffer_mut();
    for k in 0..buf.channels() {
        let values: Vec<i32> = buf.channel(k)?.into_iter().map(&f).collect();
        buf.set_channel(k, &values)?;
    }
    Ok(())
}

/// Add `value` to every sample of a one-channel region, clamping.
pub fn add_grey(region: &mut Region<'_>, value: i32) -> FilterResult<()> {
    require_gray(region, "add_grey")?;
    map_samples(region, |s| i32::from(s) + value)
}

/// Add `value`, which must lie strictly between -50 and 50, to every
/// sample of every channel.
pub fn add_brightness(region: &mut Region<'_>, value: i32) -> FilterResult<()> {
    if value <= -MAX_BRIGHTNESS_STEP || value >= MAX_BRIGHTNESS_STEP {
        return Err(FilterError::InvalidArgument(format!(
            "brightness step must lie strictly between -{MAX_BRIGHTNESS_STEP} and {MAX_BRIGHTNESS_STEP}, got {value}"
        )));
    }
    map_samples(region, |s| i32::from(s) + value)
}

/// Subtract `value` from every sample below `threshold`.
pub fn decrease_brightness(region: &mut Region<'_>, threshold: i32, value: i32) -> FilterResult<()> {
    require_threshold(threshold)?;
    map_samples(region, |s| {
        let s = i32::from(s);
        if s < threshold { s - value } else { s }
    })
}

/// Samples below `threshold` become 0, the rest 255.
pub fn binarize(region: &mut Region<'_>, threshold: i32) -> FilterResult<()> {
    require_gray(region, "binarize")?;
    require_threshold(threshold)?;
    map_samples(region, |s| if i32::from(s) < threshold { 0 } else { 255 })
}

/// Nearest-neighbour zoom about the region origin by `ratio` in `[1, 2]`.
///
/// The output keeps the region extent: sample `(i, j)` takes the value at
/// `(floor(i / ratio), floor(j / ratio))`, so the zoomed content beyond
/// the region edge is cropped.
pub fn scale(region: &mut Region<'_>, ratio: f32) -> FilterResult<()> {
    if !(1.0..=2.0).contains(&ratio) {
        return Err(FilterError::InvalidArgument(format!(
            "scaling ratio must lie in [1, 2], got {ratio}"
        )));
    }

    let src = region.buffer();
    let (rows, cols, channels) = src.shape();
    let mut samples = Vec::with_capacity(rows * cols * channels);
    for i in 0..rows {
        let si = ((i as f32 / ratio) as usize).min(rows - 1);
        for j in 0..cols {
            let sj = ((j as f32 / ratio) as usize).min(cols - 1);
            for k in 0..channels {
                samples.push(src.get(si, sj, k)?);
            }
        }
    }
    let scaled = PixelBuffer::from_samples(rows, cols, channels, samples)?;
    region.buffer_mut().deep_copy(&scaled)?;
    Ok(())
}

/// Rotate a square region clockwise by `angle` degrees.
///
/// `angle` must be a positive multiple of 90.
pub fn rotate(region: &mut Region<'_>, angle: i32) -> FilterResult<()> {
    if angle <= 0 {
        return Err(FilterError::InvalidArgument(format!(
            "rotation angle must be positive, got {angle}"
        )));
    }
    if angle % 90 != 0 {
        return Err(FilterError::InvalidArgument(format!(
            "rotation angle must be a multiple of 90, got {angle}"
        )));
    }
    region.enforce_square(true)?;

    let turns = (angle / 90) % 4;
    if turns == 0 {
        return Ok(());
    }

    let (n, _, channels) = region.buffer().shape();
    let mut current = region.buffer().samples().to_vec();
    for _ in 0..turns {
        let mut next = vec![0u8; current.len()];
        for i in 0..n {
            for j in 0..n {
                let from = (i * n + j) * channels;
                let to = (j * n + (n - 1 - i)) * channels;
                next[to..to + channels].copy_from_slice(&current[from..from + channels]);
            }
        }
        current = next;
    }

    let rotated = PixelBuffer::from_samples(n, n, channels, current)?;
    region.buffer_mut().deep_copy(&rotated)?;
    log::debug!("rotated {n}x{n} region by {angle} degrees");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_region_values(samples: Vec<u8>, rows: usize, cols: usize, f: impl FnOnce(&mut Region<'_>)) -> Vec<u8> {
        let mut image = PixelBuffer::from_samples(rows, cols, 1, samples).unwrap();
        let mut region = Region::new(&mut image, 0, 0, rows, cols).unwrap();
        f(&mut region);
        region.buffer().samples().to_vec()
    }

    #[test]
    fn test_add_grey_clamps() {
        let out = gray_region_values(vec![0, 100, 200, 250], 2, 2, |r| {
            add_grey(r, 10).unwrap();
        });
        assert_eq!(out, vec![10, 110, 210, 255]);
        let out = gray_region_values(vec![5, 100], 1, 2, |r| add_grey(r, -10).unwrap());
        assert_eq!(out, vec![0, 90]);
    }

    #[test]
    fn test_gray_only_operations_reject_color() {
        let mut image = PixelBuffer::new(2, 2, 3).unwrap();
        let mut region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
        assert!(add_grey(&mut region, 1).is_err());
        assert!(binarize(&mut region, 1).is_err());
        assert!(add_brightness(&mut region, 10).is_ok());
        assert!(region.buffer().samples().iter().all(|&s| s == 10));
    }

    #[test]
    fn test_brightness_bounds() {
        let mut image = PixelBuffer::new_gray(2, 2).unwrap();
        let mut region = Region::new(&mut image, 0, 0, 2, 2).unwrap();
        assert!(add_brightness(&mut region, 50).is_err());
        assert!(add_brightness(&mut region, -50).is_err());
        assert!(add_brightness(&mut region, 49).is_ok());
        assert!(add_brightness(&mut region, -49).is_ok());
    }

    #[test]
    fn test_decrease_brightness_below_threshold_only() {
        let out = gray_region_values(vec![10, 50, 100, 200], 2, 2, |r| {
            decrease_brightness(r, 100, 20).unwrap();
        });
        assert_eq!(out, vec![0, 30, 100, 200]);
    }

    #[test]
    fn test_binarize() {
        let out = gray_region_values(vec![0, 99, 100, 255], 2, 2, |r| binarize(r, 100).unwrap());
        assert_eq!(out, vec![0, 0, 255, 255]);
    }

    #[test]
    fn test_scale_doubles_top_left() {
        let out = gray_region_values((1..=16).collect(), 4, 4, |r| scale(r, 2.0).unwrap());
        assert_eq!(
            out,
            vec![1, 1, 2, 2, 1, 1, 2, 2, 5, 5, 6, 6, 5, 5, 6, 6]
        );
        let out = gray_region_values((1..=4).collect(), 2, 2, |r| scale(r, 1.0).unwrap());
        assert_eq!(out, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        // 1 2    3 1
        // 3 4 -> 4 2
        let out = gray_region_values(vec![1, 2, 3, 4], 2, 2, |r| rotate(r, 90).unwrap());
        assert_eq!(out, vec![3, 1, 4, 2]);
        let out = gray_region_values(vec![1, 2, 3, 4], 2, 2, |r| rotate(r, 180).unwrap());
        assert_eq!(out, vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_rotate_rejects_bad_input() {
        let mut image = PixelBuffer::new_gray(2, 3).unwrap();
        let mut region = Region::new(&mut image, 0, 0, 2, 3).unwrap();
        assert!(rotate(&mut region, 90).is_err());
        assert!(rotate(&mut region, 0).is_err());
        assert!(rotate(&mut region, 45).is_err());
        assert!(rotate(&mut region, -90).is_err());
        assert!(scale(&mut region, 2.5).is_err());
        assert!(scale(&mut region, 0.5).is_err());
    }
}
