//! roikit-test - Regression test framework for roikit
//!
//! This crate provides the helpers shared by the `tests/*_reg.rs`
//! regression tests of every roikit crate:
//!
//! - [`RegParams`] - numbered comparisons with a single pass/fail report
//! - [`synth`] - deterministic synthetic images (uniform, ramps, impulses)
//!
//! # Usage
//!
//! ```ignore
//! use roikit_test::RegParams;
//!
//! let mut rp = RegParams::new("histogram");
//! rp.compare_values(64.0, count as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "display" to also write intermediate images
//!   into the regout directory for visual inspection

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use roikit_core::PixelBuffer;

/// Load a test image from the test data directory
///
/// # Arguments
///
/// * `name` - Image filename (e.g., "ramp.pgm")
pub fn load_test_image(name: &str) -> TestResult<PixelBuffer> {
    let path = test_data_path(name);
    roikit_io::read_image(&path).map_err(|e| TestError::ImageLoad {
        path: path.clone(),
        message: e.to_string(),
    })
}

/// Get the path to the workspace root
fn workspace_root() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    // roikit-test is at crates/roikit-test, so go up two directories
    format!("{}/../..", manifest_dir)
}

/// Get the path to a test data file
pub fn test_data_path(name: &str) -> String {
    format!("{}/tests/data/images/{}", workspace_root(), name)
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> String {
    format!("{}/tests/regout", workspace_root())
}
