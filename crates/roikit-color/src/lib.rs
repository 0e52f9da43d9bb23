//! Roikit Color - Color space handling
//!
//! This crate provides the two color spaces the roikit engines work in:
//!
//! - **Color space selection** ([`ColorSpace`]): parsing of the "rgb" /
//!   "hsv" names used by scripts, and the per-channel sample range
//! - **Color space conversion** ([`colorspace`]): 8-bit RGB <-> HSV for
//!   single pixels and whole buffers

pub mod colorspace;
pub mod error;

// Re-export core types
pub use roikit_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

// Re-export color space types and functions
pub use colorspace::{
    // Types
    ColorSpace,
    Hsv,
    // Pixel-level conversions
    hsv_to_rgb,
    rgb_to_hsv,
    // Buffer-level conversions
    buffer_hsv_to_rgb,
    buffer_rgb_to_hsv,
};
