//! PNM I/O regression test
//!
//! Tests read and write of PGM and PPM:
//! - ASCII test images decode to the expected samples (tests 1-4)
//! - binary write + read roundtrips for gray and color (tests 5-6)
//! - memory encode/decode (test 7)
//! - extension and channel checks (tests 8-12)
//! - headers announcing impossible rasters fail cleanly (tests 13-14)

use roikit_io::{
    ImageFormat, IoError, read_image, read_image_mem, write_image, write_image_mem,
};
use roikit_test::{RegParams, load_test_image, synth};

#[test]
fn pnmio_reg() {
    let mut rp = RegParams::new("pnmio");
    let dir = tempfile::tempdir().expect("create temp dir");

    // Test 1-2: ASCII PGM test image
    let ramp = load_test_image("ramp8.pgm").expect("load ramp8.pgm");
    rp.compare_values(1.0, ramp.channels() as f64, 0.0);
    rp.compare_values(224.0, ramp.get(7, 7, 0).unwrap() as f64, 0.0);

    // Test 3-4: ASCII PPM test image
    let patch = load_test_image("patch4.ppm").expect("load patch4.ppm");
    rp.compare_values(3.0, patch.channels() as f64, 0.0);
    rp.compare_values(255.0, patch.get(2, 0, 2).unwrap() as f64, 0.0);

    // Test 5: 8-bit gray binary roundtrip
    let path = dir.path().join("ramp.pgm");
    write_image(&ramp, &path).expect("write pgm");
    let back = read_image(&path).expect("read pgm");
    rp.compare_buffers(&ramp, &back);

    // Test 6: color binary roundtrip
    let color = synth::gradient(9, 13, 3, 7).unwrap();
    let path = dir.path().join("grad.PPM");
    write_image(&color, &path).expect("write ppm");
    let back = read_image(&path).expect("read ppm");
    rp.compare_buffers(&color, &back);

    // Test 7: memory roundtrip
    let bytes = write_image_mem(&color).unwrap();
    let back = read_image_mem(&bytes).unwrap();
    rp.compare_buffers(&color, &back);

    // Test 8: unknown extension
    let err = write_image(&ramp, dir.path().join("ramp.png")).unwrap_err();
    rp.compare_values(
        1.0,
        if matches!(err, IoError::IncorrectExtension(_)) { 1.0 } else { 0.0 },
        0.0,
    );

    // Test 9: gray buffer into a .ppm
    let err = write_image(&ramp, dir.path().join("ramp.ppm")).unwrap_err();
    rp.compare_values(
        1.0,
        if matches!(err, IoError::ChannelMismatch { format: ImageFormat::Ppm, actual: 1 }) {
            1.0
        } else {
            0.0
        },
        0.0,
    );

    // Test 10: missing file
    let err = read_image(dir.path().join("missing.pgm")).unwrap_err();
    rp.compare_values(1.0, if matches!(err, IoError::NotFound(_)) { 1.0 } else { 0.0 }, 0.0);

    // Test 11: a directory is not a file
    let sub = dir.path().join("sub.pgm");
    std::fs::create_dir(&sub).unwrap();
    let err = read_image(&sub).unwrap_err();
    rp.compare_values(1.0, if matches!(err, IoError::NotFound(_)) { 1.0 } else { 0.0 }, 0.0);

    // Test 12: PPM data behind a .pgm extension
    let renamed = dir.path().join("color.pgm");
    std::fs::write(&renamed, &bytes).unwrap();
    let err = read_image(&renamed).unwrap_err();
    rp.compare_values(1.0, if matches!(err, IoError::DecodeError(_)) { 1.0 } else { 0.0 }, 0.0);

    // Test 13: dimensions whose product overflows
    let err = read_image_mem(b"P6\n4294967295 4294967295\n255\n\0\0\0").unwrap_err();
    rp.compare_values(1.0, if matches!(err, IoError::DecodeError(_)) { 1.0 } else { 0.0 }, 0.0);

    // Test 14: a large announced raster backed by a few bytes
    let err = read_image_mem(b"P5\n16000 16000\n255\n\0\0").unwrap_err();
    rp.compare_values(1.0, if matches!(err, IoError::DecodeError(_)) { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup());
}
