//! Batch runner
//!
//! Runs parsed jobs against images on disk. For each job the source image
//! is decoded once, every region is extracted, processed and committed in
//! script order, and the result is written to the target path. A failing
//! region is logged and reported; the remaining regions and jobs still
//! run.

use crate::config::BatchConfig;
use crate::registry::OpRegistry;
use crate::script::{Job, RegionJob, parse_line};
use crate::BatchResult;
use roikit_core::{PixelBuffer, Region};
use roikit_filter::Snapshot;
use roikit_io::{ArtifactTracker, read_image, write_image};
use std::path::{Path, PathBuf};

/// Result of one job or region
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Report for one region block
#[derive(Debug, Clone)]
pub struct RegionReport {
    /// 0-based position of the block within its job
    pub index: usize,
    pub operation: String,
    pub outcome: Outcome,
    /// Snapshot files written while the region ran
    pub artifacts: Vec<PathBuf>,
}

/// Report for one script line
#[derive(Debug, Clone)]
pub struct JobReport {
    pub line: usize,
    pub source: Option<PathBuf>,
    pub target: Option<PathBuf>,
    /// Job-level outcome: parse, decode or write failures
    pub outcome: Outcome,
    pub regions: Vec<RegionReport>,
}

impl JobReport {
    fn failed_line(line: usize, message: String) -> Self {
        Self {
            line,
            source: None,
            target: None,
            outcome: Outcome::Failed(message),
            regions: Vec::new(),
        }
    }
}

/// Report for a whole script
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub jobs: Vec<JobReport>,
}

impl BatchReport {
    /// Regions that ran and were committed.
    pub fn succeeded_regions(&self) -> usize {
        self.regions().filter(|r| r.outcome.is_success()).count()
    }

    /// Regions that failed and were skipped.
    pub fn failed_regions(&self) -> usize {
        self.regions().filter(|r| !r.outcome.is_success()).count()
    }

    /// Jobs that failed as a whole.
    pub fn failed_jobs(&self) -> usize {
        self.jobs.iter().filter(|j| !j.outcome.is_success()).count()
    }

    /// Whether every job and every region succeeded.
    pub fn is_success(&self) -> bool {
        self.failed_jobs() == 0 && self.failed_regions() == 0
    }

    fn regions(&self) -> impl Iterator<Item = &RegionReport> {
        self.jobs.iter().flat_map(|j| j.regions.iter())
    }
}

/// Interprets batch scripts
pub struct BatchRunner {
    config: BatchConfig,
    registry: OpRegistry,
    tracker: ArtifactTracker,
}

impl BatchRunner {
    /// Runner over the built-in operations.
    pub fn new(config: BatchConfig) -> Self {
        Self::with_registry(config, OpRegistry::with_defaults())
    }

    /// Runner over a caller-supplied registry.
    pub fn with_registry(config: BatchConfig, registry: OpRegistry) -> Self {
        let tracker = ArtifactTracker::new(config.artifact_dir.clone());
        Self {
            config,
            registry,
            tracker,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn registry(&self) -> &OpRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut OpRegistry {
        &mut self.registry
    }

    /// Run every job of the script at `path`.
    ///
    /// Relative image paths resolve against the script's directory. A line
    /// that does not parse is reported as a failed job.
    ///
    /// # Errors
    ///
    /// Returns an I/O error only if the script itself cannot be read.
    pub fn run_script<P: AsRef<Path>>(&mut self, path: P) -> BatchResult<BatchReport> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or(Path::new("")).to_path_buf();
        log::info!("running script {}", path.display());

        let mut report = BatchReport::default();
        for (i, line) in text.lines().enumerate() {
            match parse_line(i + 1, line, &self.registry) {
                Ok(Some(mut job)) => {
                    job.resolve_paths(&base);
                    report.jobs.push(self.run_job(&job));
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("skipping line {}: {e}", i + 1);
                    report.jobs.push(JobReport::failed_line(i + 1, e.to_string()));
                }
            }
        }

        log::info!(
            "script done: {} job(s), {} region(s) succeeded, {} failed",
            report.jobs.len(),
            report.succeeded_regions(),
            report.failed_regions()
        );
        Ok(report)
    }

    /// Run one job: decode, process every region, write the target.
    pub fn run_job(&mut self, job: &Job) -> JobReport {
        log::info!(
            "line {}: {} -> {}",
            job.line,
            job.source.display(),
            job.target.display()
        );
        let mut report = JobReport {
            line: job.line,
            source: Some(job.source.clone()),
            target: Some(job.target.clone()),
            outcome: Outcome::Success,
            regions: Vec::with_capacity(job.regions.len()),
        };

        let mut image = match read_image(&job.source) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("line {}: cannot read source: {e}", job.line);
                report.outcome = Outcome::Failed(e.to_string());
                return report;
            }
        };

        for (index, region_job) in job.regions.iter().enumerate() {
            let region_report = match self.run_region(&mut image, region_job) {
                Ok(artifacts) => {
                    log::info!(
                        "line {}: region {index} {} succeeded",
                        job.line,
                        region_job.operation
                    );
                    RegionReport {
                        index,
                        operation: region_job.operation.clone(),
                        outcome: Outcome::Success,
                        artifacts,
                    }
                }
                Err(e) => {
                    log::warn!(
                        "line {}: region {index} {} failed: {e}",
                        job.line,
                        region_job.operation
                    );
                    RegionReport {
                        index,
                        operation: region_job.operation.clone(),
                        outcome: Outcome::Failed(e.to_string()),
                        artifacts: Vec::new(),
                    }
                }
            };
            report.regions.push(region_report);
        }

        if let Err(e) = write_image(&image, &job.target) {
            log::warn!("line {}: cannot write target: {e}", job.line);
            report.outcome = Outcome::Failed(e.to_string());
        }
        report
    }

    /// Extract, process and commit one region; returns the artifact paths.
    fn run_region(&mut self, image: &mut PixelBuffer, job: &RegionJob) -> BatchResult<Vec<PathBuf>> {
        let op = self.registry.lookup(&job.operation)?;
        let mut region = Region::new(image, job.start_x, job.start_y, job.total_x, job.total_y)?;
        let snapshots = op.invoke(&mut region, &job.args)?;
        region.commit()?;

        self.persist(&snapshots);
        let artifacts = self.tracker.pop_all();
        if !self.config.keep_artifacts {
            match self.tracker.delete_with_extension(&self.config.artifact_extension) {
                Ok(n) => log::debug!("removed {n} artifact file(s)"),
                Err(e) => log::warn!("cannot clean artifacts: {e}"),
            }
        }
        Ok(artifacts)
    }

    fn persist(&mut self, snapshots: &[Snapshot]) {
        for snapshot in snapshots {
            let prefix = format!("{}_ch{}", snapshot.kind.prefix(), snapshot.channel);
            match self.tracker.record(&prefix, &snapshot.image) {
                Ok(path) => log::info!("artifact written: {}", path.display()),
                Err(e) => log::warn!("cannot write {prefix} artifact: {e}"),
            }
        }
    }
}
