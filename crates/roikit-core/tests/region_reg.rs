//! Region regression test
//!
//! Checks extraction and commit of rectangular regions:
//! - extract then commit leaves the source byte-identical
//! - a 2x2 region of an all-zero image commits zeros
//! - edited regions only reach the source through commit
//! - placement failures leave the source untouched
//! - a closed source refuses new regions

use roikit_core::{Error, PixelBuffer, Region};
use roikit_test::{RegParams, synth};

#[test]
fn region_reg() {
    let mut rp = RegParams::new("region");

    // Test 1: extract + commit identity on a color ramp
    let mut image = synth::gradient(12, 10, 3, 11).unwrap();
    let before = image.duplicate();
    let region = Region::new(&mut image, 3, 2, 6, 8).unwrap();
    region.commit().unwrap();
    rp.compare_buffers(&before, &image);

    // Test 2: 2x2 zero commit
    let mut zeros = PixelBuffer::new(6, 6, 1).unwrap();
    let region = Region::new(&mut zeros, 2, 3, 2, 2).unwrap();
    region.commit().unwrap();
    rp.compare_values(0.0, zeros.samples().iter().map(|&s| s as f64).sum(), 0.0);

    // Test 3-4: an edit lands at the offset only after commit
    let mut image = PixelBuffer::new(6, 6, 1).unwrap();
    let mut region = Region::new(&mut image, 4, 4, 2, 2).unwrap();
    region.buffer_mut().set(1, 1, 0, 77).unwrap();
    rp.compare_values(0.0, region.source().get(5, 5, 0).unwrap() as f64, 0.0);
    region.commit().unwrap();
    rp.compare_values(77.0, image.get(5, 5, 0).unwrap() as f64, 0.0);

    // Test 5-6: a region that overhangs the edge is rejected
    let mut image = synth::uniform(6, 6, 1, 40).unwrap();
    let before = image.duplicate();
    let err = Region::new(&mut image, 4, 4, 3, 2).unwrap_err();
    rp.compare_values(
        1.0,
        if matches!(err, Error::RoiOutOfBounds { .. }) { 1.0 } else { 0.0 },
        0.0,
    );
    rp.compare_buffers(&before, &image);

    // Test 7: a closed source keeps its shape but yields no region
    let mut image = synth::uniform(6, 6, 1, 40).unwrap();
    image.close();
    let err = Region::new(&mut image, 0, 0, 2, 2).unwrap_err();
    rp.compare_values(
        1.0,
        if matches!(err, Error::InvalidArgument(_)) { 1.0 } else { 0.0 },
        0.0,
    );

    assert!(rp.cleanup());
}
