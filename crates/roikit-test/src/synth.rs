//! Synthetic test images
//!
//! Small deterministic buffers used by the regression tests in place of
//! stored image files.

use crate::TestResult;
use roikit_core::PixelBuffer;

/// Every sample set to `value`.
pub fn uniform(rows: usize, cols: usize, channels: usize, value: u8) -> TestResult<PixelBuffer> {
    let samples = vec![value; rows * cols * channels];
    Ok(PixelBuffer::from_samples(rows, cols, channels, samples)?)
}

/// Diagonal ramp: sample `(r, c, k)` is `(r * step + c * step + k * 40) % 256`.
pub fn gradient(rows: usize, cols: usize, channels: usize, step: usize) -> TestResult<PixelBuffer> {
    let mut samples = Vec::with_capacity(rows * cols * channels);
    for r in 0..rows {
        for c in 0..cols {
            for k in 0..channels {
                samples.push(((r * step + c * step + k * 40) % 256) as u8);
            }
        }
    }
    Ok(PixelBuffer::from_samples(rows, cols, channels, samples)?)
}

/// One-channel zero buffer with a single sample set to `value`.
pub fn impulse(rows: usize, cols: usize, row: usize, col: usize, value: u8) -> TestResult<PixelBuffer> {
    let mut buf = PixelBuffer::new_gray(rows, cols)?;
    buf.set_gray(row, col, i32::from(value))?;
    Ok(buf)
}

/// One-channel checkerboard of `cell x cell` squares alternating `lo`/`hi`.
pub fn checkerboard(rows: usize, cols: usize, cell: usize, lo: u8, hi: u8) -> TestResult<PixelBuffer> {
    let cell = cell.max(1);
    let samples = (0..rows * cols)
        .map(|i| {
            let (r, c) = (i / cols, i % cols);
            if (r / cell + c / cell) % 2 == 0 { lo } else { hi }
        })
        .collect();
    Ok(PixelBuffer::from_samples(rows, cols, 1, samples)?)
}
