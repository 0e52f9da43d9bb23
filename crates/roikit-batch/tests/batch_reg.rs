//! Batch regression test
//!
//! Runs scripts end to end in a temporary directory:
//! - region successes and failures within one job (tests 1-4)
//! - artifacts are reported and then removed (tests 5-6)
//! - missing sources and unparseable lines fail their job only (tests 7-8)
//! - a color job through the spectral filter (tests 9-10)
//! - artifacts survive when retention is on (test 11)

use roikit_batch::{BatchConfig, BatchRunner, Outcome};
use roikit_io::{read_image, write_image};
use roikit_test::{RegParams, synth};
use std::fs;

fn flag(ok: bool) -> f64 {
    if ok { 1.0 } else { 0.0 }
}

#[test]
fn batch_reg() {
    let mut rp = RegParams::new("batch");
    let dir = tempfile::tempdir().expect("create temp dir");
    let art = dir.path().join("artifacts");

    let gray = synth::gradient(8, 8, 1, 16).unwrap();
    write_image(&gray, dir.path().join("in.pgm")).unwrap();
    let color = synth::gradient(8, 8, 3, 13).unwrap();
    write_image(&color, dir.path().join("c.ppm")).unwrap();

    let script = dir.path().join("jobs.txt");
    fs::write(
        &script,
        "# gray job: one failing region in the middle\n\
         in.pgm out.pgm 3 0 0 4 4 addGrey 300 4 4 4 4 rotate 45 0 0 8 8 histogramEqualization rgb 0\n\
         missing.pgm out2.pgm 0\n\
         in.pgm out3.pgm 1 0 0 4 4 blur 3\n\
         \n\
         c.ppm c_out.ppm 1 0 0 8 8 lowPassFilter hsv 2 3\n",
    )
    .unwrap();

    let config = BatchConfig::default().with_artifact_dir(&art);
    let mut runner = BatchRunner::new(config);
    let report = runner.run_script(&script).unwrap();

    // Test 1-4: first job
    rp.compare_values(4.0, report.jobs.len() as f64, 0.0);
    let job = &report.jobs[0];
    rp.compare_values(1.0, flag(job.outcome == Outcome::Success), 0.0);
    let outcomes: Vec<bool> = job.regions.iter().map(|r| r.outcome.is_success()).collect();
    rp.compare_values(1.0, flag(outcomes == [true, false, true]), 0.0);
    let out = read_image(dir.path().join("out.pgm")).unwrap();
    rp.compare_values(255.0, out.get(0, 0, 0).unwrap() as f64, 0.0);

    // Test 5-6: two histogram snapshots, deleted after the region
    let artifacts = &job.regions[2].artifacts;
    rp.compare_values(2.0, artifacts.len() as f64, 0.0);
    rp.compare_values(0.0, artifacts.iter().filter(|p| p.exists()).count() as f64, 0.0);

    // Test 7-8: failed jobs
    rp.compare_values(1.0, flag(!report.jobs[1].outcome.is_success()), 0.0);
    rp.compare_values(
        1.0,
        flag(!report.jobs[2].outcome.is_success() && report.jobs[2].line == 4),
        0.0,
    );

    // Test 9-10: color spectral job
    let job = &report.jobs[3];
    rp.compare_values(1.0, flag(job.regions.len() == 1 && job.regions[0].outcome.is_success()), 0.0);
    let out = read_image(dir.path().join("c_out.ppm")).unwrap();
    rp.compare_values(3.0, out.channels() as f64, 0.0);

    // Test 11: retained artifacts
    let config = BatchConfig::default()
        .with_artifact_dir(&art)
        .with_keep_artifacts(true);
    let mut runner = BatchRunner::new(config);
    let keep_script = dir.path().join("keep.txt");
    fs::write(&keep_script, "in.pgm out4.pgm 1 0 0 8 8 histogramStretch 0 255 0\n").unwrap();
    let report = runner.run_script(&keep_script).unwrap();
    let artifacts = &report.jobs[0].regions[0].artifacts;
    rp.compare_values(
        1.0,
        flag(artifacts.len() == 2 && artifacts.iter().all(|p| p.exists())),
        0.0,
    );

    assert!(rp.cleanup());
}
