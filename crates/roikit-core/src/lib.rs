//! Roikit Core - Pixel buffers and regions of interest
//!
//! This crate provides the data model shared by the rest of the roikit
//! toolkit:
//!
//! - [`PixelBuffer`] - dense 8-bit image with change notification
//! - [`Region`] - rectangular working copy of a buffer, committed back
//!   explicitly
//!
//! Every other crate in the workspace operates on these two types.

pub mod buffer;
pub mod error;
pub mod region;

pub use buffer::{MAX_SAMPLE, Observer, ObserverId, PixelBuffer, clamp_sample};
pub use error::{Error, Result};
pub use region::Region;
