//! roikit-filter - Region filtering operations
//!
//! This crate provides the operations applied to a [`Region`]:
//!
//! - Histogram equalization, stretching and threshold equalization
//!   ([`HistogramEngine`])
//! - Low-pass, high-pass and band-stop filters and unsharp masking in the
//!   frequency domain ([`SpectralFilterEngine`])
//! - Point and geometric operations ([`point`])
//!
//! Engines record diagnostic [`Snapshot`]s that callers drain and persist
//! as they see fit.
//!
//! [`Region`]: roikit_core::Region

mod error;
pub mod fourier;
pub mod histogram;
pub mod point;
pub mod snapshot;

pub use error::{FilterError, FilterResult};
pub use fourier::{FilterKind, SpectralFilterEngine};
pub use histogram::{HistogramBin, HistogramEngine, channel_histogram_image, equalize_samples};
pub use snapshot::{Snapshot, SnapshotKind};
