//! Complex 2-D planes and their discrete Fourier transforms
//!
//! The forward transform zero-pads its input to a size that factors into
//! 2, 3 and 5 only, then runs a row pass and a column pass. The column
//! pass transposes the plane so every FFT call works on contiguous rows.

use crate::{FilterError, FilterResult};
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Smallest `m >= n` whose only prime factors are 2, 3 and 5.
///
/// ```
/// use roikit_filter::fourier::optimal_dft_size;
///
/// assert_eq!(optimal_dft_size(7), 8);
/// assert_eq!(optimal_dft_size(11), 12);
/// assert_eq!(optimal_dft_size(16), 16);
/// ```
pub fn optimal_dft_size(n: usize) -> usize {
    let mut m = n.max(1);
    loop {
        let mut rest = m;
        for p in [2, 3, 5] {
            while rest % p == 0 {
                rest /= p;
            }
        }
        if rest == 1 {
            return m;
        }
        m += 1;
    }
}

/// Row-major grid of complex values
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralPlane {
    rows: usize,
    cols: usize,
    data: Vec<Complex<f32>>,
}

impl SpectralPlane {
    /// Plane of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Complex::new(0.0, 0.0); rows * cols],
        }
    }

    /// Real plane from row-major values.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::PlaneSizeMismatch`] if
    /// `values.len() != rows * cols`.
    pub fn from_real(values: &[f32], rows: usize, cols: usize) -> FilterResult<Self> {
        if values.len() != rows * cols {
            return Err(FilterError::PlaneSizeMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            data: values.iter().map(|&v| Complex::new(v, 0.0)).collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn data(&self) -> &[Complex<f32>] {
        &self.data
    }

    /// Value at `(row, col)`; `None` outside the plane.
    pub fn at(&self, row: usize, col: usize) -> Option<Complex<f32>> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    /// Forward 2-D DFT of `values`, zero-padded to the optimal size.
    pub fn transform(values: &[f32], rows: usize, cols: usize, planner: &mut FftPlanner<f32>) -> FilterResult<Self> {
        if values.len() != rows * cols {
            return Err(FilterError::PlaneSizeMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        let padded_rows = optimal_dft_size(rows);
        let padded_cols = optimal_dft_size(cols);
        let mut plane = Self::zeros(padded_rows, padded_cols);
        for r in 0..rows {
            for c in 0..cols {
                plane.data[r * padded_cols + c] = Complex::new(values[r * cols + c], 0.0);
            }
        }
        plane.fft_2d(planner, false);
        Ok(plane)
    }

    /// Inverse 2-D DFT, scaled by `1 / (rows * cols)`.
    pub fn inverse(&self, planner: &mut FftPlanner<f32>) -> SpectralPlane {
        let mut out = self.clone();
        out.fft_2d(planner, true);
        let scale = 1.0 / (self.rows * self.cols) as f32;
        for v in out.data.iter_mut() {
            *v *= scale;
        }
        out
    }

    fn fft_2d(&mut self, planner: &mut FftPlanner<f32>, inverse: bool) {
        self.fft_rows(planner, inverse);
        self.transpose();
        self.fft_rows(planner, inverse);
        self.transpose();
    }

    fn fft_rows(&mut self, planner: &mut FftPlanner<f32>, inverse: bool) {
        let fft = if inverse {
            planner.plan_fft_inverse(self.cols)
        } else {
            planner.plan_fft_forward(self.cols)
        };
        for row in self.data.chunks_exact_mut(self.cols) {
            fft.process(row);
        }
    }

    fn transpose(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        let mut out = vec![Complex::new(0.0, 0.0); self.data.len()];
        for r in 0..rows {
            for c in 0..cols {
                out[c * rows + r] = self.data[r * cols + c];
            }
        }
        self.data = out;
        self.rows = cols;
        self.cols = rows;
    }

    /// Swap diagonal quadrants so the zero frequency moves to the center.
    ///
    /// The swap covers the largest even-sized top-left sub-rectangle; an
    /// odd trailing row or column stays in place. On even-sized planes the
    /// shift is its own inverse.
    pub fn quadrant_shift(&mut self) {
        let cx = self.cols / 2;
        let cy = self.rows / 2;
        let cols = self.cols;
        for r in 0..cy {
            for c in 0..cx {
                // top-left <-> bottom-right
                self.data.swap(r * cols + c, (r + cy) * cols + c + cx);
                // top-right <-> bottom-left
                self.data.swap(r * cols + c + cx, (r + cy) * cols + c);
            }
        }
    }

    /// `ln(1 + |F|)` of every value, row-major.
    pub fn log_magnitude(&self) -> Vec<f32> {
        self.data.iter().map(|v| v.norm().ln_1p()).collect()
    }

    /// Real parts, row-major.
    pub fn real(&self) -> Vec<f32> {
        self.data.iter().map(|v| v.re).collect()
    }

    /// Multiply every value by the matching mask weight.
    pub fn apply_mask(&mut self, mask: &[f32]) -> FilterResult<()> {
        if mask.len() != self.data.len() {
            return Err(FilterError::PlaneSizeMismatch {
                expected: self.data.len(),
                actual: mask.len(),
            });
        }
        for (v, &m) in self.data.iter_mut().zip(mask) {
            *v *= m;
        }
        Ok(())
    }

    /// Element-wise sum with another plane of the same size.
    pub fn add(&mut self, other: &SpectralPlane) -> FilterResult<()> {
        if other.data.len() != self.data.len() {
            return Err(FilterError::PlaneSizeMismatch {
                expected: self.data.len(),
                actual: other.data.len(),
            });
        }
        for (v, &o) in self.data.iter_mut().zip(&other.data) {
            *v += o;
        }
        Ok(())
    }

    pub fn scale(&mut self, factor: f32) {
        for v in self.data.iter_mut() {
            *v *= factor;
        }
    }

    /// Real parts of the top-left `rows x cols` window, row-major.
    pub fn crop_real(&self, rows: usize, cols: usize) -> Vec<f32> {
        let rows = rows.min(self.rows);
        let cols = cols.min(self.cols);
        let mut out = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            let start = r * self.cols;
            out.extend(self.data[start..start + cols].iter().map(|v| v.re));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_dft_size() {
        assert_eq!(optimal_dft_size(0), 1);
        assert_eq!(optimal_dft_size(1), 1);
        assert_eq!(optimal_dft_size(7), 8);
        assert_eq!(optimal_dft_size(13), 15);
        assert_eq!(optimal_dft_size(17), 18);
        assert_eq!(optimal_dft_size(64), 64);
        assert_eq!(optimal_dft_size(97), 100);
    }

    #[test]
    fn test_transform_of_constant_is_dc() {
        let mut planner = FftPlanner::new();
        let plane = SpectralPlane::transform(&[2.0; 16], 4, 4, &mut planner).unwrap();
        let dc = plane.at(0, 0).unwrap();
        assert!((dc.re - 32.0).abs() < 1e-4);
        for r in 0..4 {
            for c in 0..4 {
                if (r, c) != (0, 0) {
                    assert!(plane.at(r, c).unwrap().norm() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_roundtrip_non_square() {
        let mut planner = FftPlanner::new();
        let values: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let plane = SpectralPlane::transform(&values, 3, 4, &mut planner).unwrap();
        assert_eq!((plane.rows(), plane.cols()), (3, 4));
        let back = plane.inverse(&mut planner).crop_real(3, 4);
        for (a, b) in values.iter().zip(&back) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }

    #[test]
    fn test_padding_grows_plane() {
        let mut planner = FftPlanner::new();
        let plane = SpectralPlane::transform(&[1.0; 49], 7, 7, &mut planner).unwrap();
        assert_eq!((plane.rows(), plane.cols()), (8, 8));
        assert!(SpectralPlane::transform(&[1.0; 3], 2, 2, &mut planner).is_err());
    }

    #[test]
    fn test_quadrant_shift_even_is_involution() {
        let values: Vec<f32> = (0..16).map(|v| v as f32).collect();
        let mut plane = SpectralPlane::from_real(&values, 4, 4).unwrap();
        plane.quadrant_shift();
        assert_eq!(plane.at(2, 2).unwrap().re, 0.0);
        assert_eq!(plane.at(0, 0).unwrap().re, 10.0);
        plane.quadrant_shift();
        assert_eq!(plane.real(), values);
    }

    #[test]
    fn test_quadrant_shift_odd_keeps_trailing_row() {
        let values: Vec<f32> = (0..9).map(|v| v as f32).collect();
        let mut plane = SpectralPlane::from_real(&values, 3, 3).unwrap();
        plane.quadrant_shift();
        // 2x2 core is 1x1 quadrants: 0 <-> 4, 1 <-> 3
        assert_eq!(plane.real(), vec![4.0, 3.0, 2.0, 1.0, 0.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_mask_add_scale() {
        let mut a = SpectralPlane::from_real(&[1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let b = a.clone();
        a.apply_mask(&[1.0, 0.0, 0.0, 1.0]).unwrap();
        a.add(&b).unwrap();
        a.scale(0.5);
        assert_eq!(a.real(), vec![1.0, 1.0, 1.5, 4.0]);
        assert!(a.apply_mask(&[1.0]).is_err());
        assert_eq!(a.crop_real(1, 2), vec![1.0, 1.0]);
    }
}
