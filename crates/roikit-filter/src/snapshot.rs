//! Diagnostic snapshots
//!
//! Engines render one-channel diagnostic images before and after each
//! operation: bar histograms for the histogram engine and log-magnitude
//! spectra for the spectral engine. They stay in memory until the caller
//! drains them; persisting them is the caller's business.

use roikit_core::PixelBuffer;

/// What a snapshot shows, and when it was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotKind {
    HistogramBefore,
    HistogramAfter,
    SpectrumBefore,
    SpectrumAfter,
}

impl SnapshotKind {
    /// File name prefix used when the snapshot is persisted.
    pub fn prefix(self) -> &'static str {
        match self {
            SnapshotKind::HistogramBefore => "hist_before",
            SnapshotKind::HistogramAfter => "hist_after",
            SnapshotKind::SpectrumBefore => "spectrum_before",
            SnapshotKind::SpectrumAfter => "spectrum_after",
        }
    }
}

/// One-channel diagnostic image of one channel of a region
#[derive(Debug)]
pub struct Snapshot {
    pub kind: SnapshotKind,
    pub channel: usize,
    pub image: PixelBuffer,
}

impl Snapshot {
    pub fn new(kind: SnapshotKind, channel: usize, image: PixelBuffer) -> Self {
        Self {
            kind,
            channel,
            image,
        }
    }
}
