//! Color space conversion
//!
//! Provides the 8-bit RGB <-> HSV conversion used by the histogram and
//! spectral engines.
//!
//! # HSV convention
//!
//! All three components fit in a byte:
//!
//! - `h`: hue in half-degrees, `[0, 179]` (180 wraps to 0)
//! - `s`: saturation, `255 * (max - min) / max`
//! - `v`: value, `max(r, g, b)`
//!
//! Hue correspondence:
//! - 0: red
//! - 30: yellow
//! - 60: green
//! - 90: cyan
//! - 120: blue
//! - 150: magenta
//!
//! HSV buffers store h, s, v in channels 0, 1, 2.

use crate::{ColorError, ColorResult};
use roikit_core::PixelBuffer;
use std::fmt;
use std::str::FromStr;

/// Largest hue value in the 8-bit convention
pub const HUE_MAX: u8 = 179;

/// Color space an engine operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Channels used as stored (gray, or red/green/blue)
    #[default]
    Rgb,
    /// Hue, saturation, value computed from a three-channel buffer
    Hsv,
}

impl ColorSpace {
    /// Parse a color space name.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace; an
    /// empty name selects [`ColorSpace::Rgb`].
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::IllegalColorspace`] for any other name.
    pub fn parse(name: &str) -> ColorResult<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("rgb") {
            Ok(ColorSpace::Rgb)
        } else if trimmed.eq_ignore_ascii_case("hsv") {
            Ok(ColorSpace::Hsv)
        } else {
            Err(ColorError::IllegalColorspace(name.to_string()))
        }
    }

    /// Lowercase name, as accepted by [`parse`](Self::parse).
    pub fn name(self) -> &'static str {
        match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Hsv => "hsv",
        }
    }

    /// Largest sample value of `channel` in this color space.
    ///
    /// Every rgb channel and the hsv saturation and value channels reach
    /// 255; the hsv hue channel stops at [`HUE_MAX`].
    pub fn channel_max(self, channel: usize) -> u8 {
        match (self, channel) {
            (ColorSpace::Hsv, 0) => HUE_MAX,
            _ => 255,
        }
    }
}

impl FromStr for ColorSpace {
    type Err = ColorError;

    fn from_str(s: &str) -> ColorResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// HSV color in the 8-bit convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    /// Create a new HSV color
    pub fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Convert an RGB pixel to HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let ri = r as i32;
    let gi = g as i32;
    let bi = b as i32;

    let min = ri.min(gi).min(bi);
    let max = ri.max(gi).max(bi);
    let delta = max - min;

    let v = max as u8;
    if delta == 0 {
        return Hsv { h: 0, s: 0, v };
    }

    let s = (255.0 * delta as f32 / max as f32 + 0.5) as u8;
    let sector = if ri == max {
        (gi - bi) as f32 / delta as f32
    } else if gi == max {
        2.0 + (bi - ri) as f32 / delta as f32
    } else {
        4.0 + (ri - gi) as f32 / delta as f32
    };

    let mut h = sector * 30.0;
    if h < 0.0 {
        h += 180.0;
    }
    let mut h = (h + 0.5) as i32;
    if h > HUE_MAX as i32 {
        h = 0;
    }

    Hsv { h: h as u8, s, v }
}

/// Convert an HSV pixel to RGB.
///
/// Hue values above [`HUE_MAX`] wrap modulo 180.
pub fn hsv_to_rgb(hsv: Hsv) -> (u8, u8, u8) {
    let Hsv { h, s: sval, v: vval } = hsv;

    if sval == 0 {
        return (vval, vval, vval);
    }

    let hf = (h as u32 % 180) as f32 / 30.0;
    let i = hf as i32;
    let f = hf - i as f32;
    let s = sval as f32 / 255.0;
    let v = vval as f32;
    let p = (v * (1.0 - s) + 0.5) as u8;
    let q = (v * (1.0 - s * f) + 0.5) as u8;
    let t = (v * (1.0 - s * (1.0 - f)) + 0.5) as u8;

    match i {
        0 => (vval, t, p),
        1 => (q, vval, p),
        2 => (p, vval, t),
        3 => (p, q, vval),
        4 => (t, p, vval),
        _ => (vval, p, q),
    }
}

fn require_three_channels(buf: &PixelBuffer) -> ColorResult<()> {
    if buf.channels() != 3 {
        return Err(ColorError::UnsupportedChannels {
            expected: 3,
            actual: buf.channels(),
        });
    }
    Ok(())
}

fn map_pixels(buf: &PixelBuffer, f: impl Fn(u8, u8, u8) -> (u8, u8, u8)) -> ColorResult<PixelBuffer> {
    require_three_channels(buf)?;
    let mut samples = Vec::with_capacity(buf.samples().len());
    for px in buf.samples().chunks_exact(3) {
        let (a, b, c) = f(px[0], px[1], px[2]);
        samples.extend_from_slice(&[a, b, c]);
    }
    Ok(PixelBuffer::from_samples(
        buf.rows(),
        buf.cols(),
        3,
        samples,
    )?)
}

/// Convert an RGB buffer to an HSV buffer of the same shape.
///
/// The result has no observers.
///
/// # Errors
///
/// Returns [`ColorError::UnsupportedChannels`] unless `buf` has three
/// channels.
pub fn buffer_rgb_to_hsv(buf: &PixelBuffer) -> ColorResult<PixelBuffer> {
    map_pixels(buf, |r, g, b| {
        let hsv = rgb_to_hsv(r, g, b);
        (hsv.h, hsv.s, hsv.v)
    })
}

/// Convert an HSV buffer back to RGB.
///
/// # Errors
///
/// Returns [`ColorError::UnsupportedChannels`] unless `buf` has three
/// channels.
pub fn buffer_hsv_to_rgb(buf: &PixelBuffer) -> ColorResult<PixelBuffer> {
    map_pixels(buf, |h, s, v| hsv_to_rgb(Hsv { h, s, v }))
}
