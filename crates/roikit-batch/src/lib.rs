//! roikit-batch - Batch script interpreter
//!
//! This crate turns text scripts into region operations:
//!
//! - **Registry** ([`registry`]): operation names, typed parameter lists
//!   and the functions behind them
//! - **Scripts** ([`script`]): one job per line, each naming a source
//!   image, a target path and a list of region blocks
//! - **Runner** ([`runner`]): decodes, processes, commits and writes,
//!   persisting diagnostic snapshots through the artifact tracker
//! - **Configuration** ([`config`]): artifact directory and retention
//!
//! # Examples
//!
//! ```no_run
//! use roikit_batch::{BatchConfig, BatchRunner};
//!
//! let mut runner = BatchRunner::new(BatchConfig::from_env());
//! let report = runner.run_script("jobs.txt").unwrap();
//! println!("{} region(s) failed", report.failed_regions());
//! ```

pub mod config;
mod error;
pub mod registry;
pub mod runner;
pub mod script;

pub use config::BatchConfig;
pub use error::{BatchError, BatchResult};
pub use registry::{OpFn, OpRegistry, OpSpec, ParamType, ParamValue};
pub use runner::{BatchReport, BatchRunner, JobReport, Outcome, RegionReport};
pub use script::{Job, RegionJob, parse_line, parse_script};
