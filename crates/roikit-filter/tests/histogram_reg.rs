//! Histogram regression test
//!
//! Covers the histogram engine end to end:
//! - the bin partitions every channel of the region (tests 1-3)
//! - stretching keeps the intensity order (test 4)
//! - equalization spreads the ramp to the full range (tests 5-6)
//! - per-channel equalization of a color region (tests 7-8)
//! - threshold equalization only touches dark pixels (test 9)
//! - the source changes only on commit (tests 10-11)

use roikit_core::Region;
use roikit_filter::{HistogramEngine, SnapshotKind};
use roikit_test::{RegParams, load_test_image, synth};
use std::collections::HashSet;

#[test]
fn histogram_reg() {
    let mut rp = RegParams::new("histogram");

    // Test 1-3: bucket partition on a color ramp
    let mut image = synth::gradient(8, 8, 3, 9).unwrap();
    let mut region = Region::new(&mut image, 0, 0, 8, 8).unwrap();
    {
        let engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        let bin = engine.bin();
        for k in 0..3 {
            let mut seen = HashSet::new();
            for intensity in 0..=255 {
                for &coord in bin.bucket(k, intensity) {
                    seen.insert(coord);
                }
            }
            rp.compare_values(64.0, seen.len() as f64, 0.0);
        }
    }

    // Test 4: stretch preserves order
    let mut image = synth::gradient(16, 16, 1, 8).unwrap();
    let before = image.channel(0).unwrap();
    let mut region = Region::new(&mut image, 0, 0, 16, 16).unwrap();
    {
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_stretch(0, 255, 0).unwrap();
    }
    let after = region.buffer().channel(0).unwrap();
    let mut pairs: Vec<(u8, u8)> = before.iter().copied().zip(after.iter().copied()).collect();
    pairs.sort();
    let monotonic = pairs.windows(2).all(|w| w[0].1 <= w[1].1);
    rp.compare_values(1.0, if monotonic { 1.0 } else { 0.0 }, 0.0);

    // Test 5-6: equalization of the ramp test image
    let mut ramp = load_test_image("ramp8.pgm").expect("load ramp8.pgm");
    let mut region = Region::new(&mut ramp, 0, 0, 8, 8).unwrap();
    {
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_equalization(0).unwrap();
        let bin = engine.bin();
        rp.compare_values(0.0, bin.lowest_nonempty(0).unwrap() as f64, 0.0);
        rp.compare_values(255.0, bin.highest_nonempty(0).unwrap() as f64, 0.0);
    }

    // Test 7-8: every channel of a color region
    let mut image = synth::gradient(8, 8, 3, 9).unwrap();
    let mut region = Region::new(&mut image, 0, 0, 8, 8).unwrap();
    {
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_equalization_all().unwrap();
        let top = (0..3)
            .filter(|&k| engine.bin().highest_nonempty(k) == Some(255))
            .count();
        rp.compare_values(3.0, top as f64, 0.0);
        let snapshots = engine.take_snapshots();
        let after = snapshots
            .iter()
            .filter(|s| s.kind == SnapshotKind::HistogramAfter)
            .count();
        rp.compare_values(3.0, after as f64, 0.0);
    }

    // Test 9: bright pixels survive threshold equalization
    let mut image = synth::checkerboard(8, 8, 2, 20, 220).unwrap();
    let mut region = Region::new(&mut image, 0, 0, 8, 8).unwrap();
    {
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_threshold_equalization(128, 0).unwrap();
    }
    let bright = region
        .buffer()
        .samples()
        .iter()
        .filter(|&&s| s == 220)
        .count();
    rp.compare_values(32.0, bright as f64, 0.0);

    // Test 10-11: the source only changes on commit
    let mut image = synth::gradient(8, 8, 1, 4).unwrap();
    let original = image.duplicate();
    let mut region = Region::new(&mut image, 2, 2, 4, 4).unwrap();
    {
        let mut engine = HistogramEngine::new(&mut region, "rgb").unwrap();
        engine.perform_equalization(0).unwrap();
    }
    rp.compare_buffers(&original, region.source());
    let edited = region.buffer().duplicate();
    region.commit().unwrap();
    rp.compare_values(
        edited.get(3, 3, 0).unwrap() as f64,
        image.get(5, 5, 0).unwrap() as f64,
        0.0,
    );

    assert!(rp.cleanup());
}
