//! roikit - Region-scoped image filtering for Rust
//!
//! # Overview
//!
//! roikit applies filters to rectangular regions of PGM/PPM images. A
//! region is extracted into its own buffer, processed, and written back to
//! the source image only when committed. Operations include:
//!
//! - Histogram equalization, stretching and threshold equalization, in rgb
//!   or hsv
//! - Low-pass, high-pass and band-stop filters and unsharp masking in the
//!   frequency domain
//! - Point and geometric operations (brightness, binarization, scaling,
//!   rotation)
//! - A batch interpreter driving all of the above from text scripts
//!
//! # Example
//!
//! ```
//! use roikit::{PixelBuffer, Region};
//! use roikit::filter::HistogramEngine;
//!
//! let mut image = PixelBuffer::new_gray(8, 8).unwrap();
//! image.set_gray(2, 3, 90).unwrap();
//!
//! let mut region = Region::new(&mut image, 0, 0, 4, 4).unwrap();
//! {
//!     let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
//!     engine.perform_equalization(0).unwrap();
//! }
//! region.commit().unwrap();
//! assert_eq!(image.get_gray(2, 3).unwrap(), 255);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use roikit_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use roikit_batch as batch;
pub use roikit_color as color;
pub use roikit_filter as filter;
pub use roikit_io as io;
