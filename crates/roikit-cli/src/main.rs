//! roikit CLI - batch runner for region-scoped image filtering

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use roikit_batch::{BatchConfig, BatchRunner, OpRegistry, Outcome};
use std::path::PathBuf;
use std::process::ExitCode;

/// Environment variable holding the default log specification
const LOG_ENV: &str = "ROIKIT_LOG";

#[derive(Parser)]
#[command(name = "roikit")]
#[command(about = "Apply histogram, Fourier and point filters to regions of PGM/PPM images")]
#[command(version)]
struct Cli {
    /// Log level or flexi_logger spec (default: $ROIKIT_LOG, else info).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write rotating log files to this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every job of a batch script.
    Run(RunArgs),

    /// List the registered operations and their parameters.
    Ops,
}

#[derive(Debug, Clone, Args)]
struct RunArgs {
    /// Path to the script, one job per line.
    script: PathBuf,

    /// Directory for diagnostic snapshots.
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Keep snapshot files instead of deleting them after each region.
    #[arg(long)]
    keep_artifacts: bool,
}

fn setup_logging(level: Option<&str>, dir: Option<&PathBuf>) -> Result<LoggerHandle> {
    let spec = level
        .map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV).ok())
        .unwrap_or_else(|| "info".to_string());

    let logger = Logger::try_with_str(&spec).with_context(|| format!("invalid log level {spec:?}"))?;
    let logger = match dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("roikit"))
            .duplicate_to_stderr(Duplicate::All)
            .rotate(
                Criterion::Size(1024 * 1024), // 1MB
                Naming::Timestamps,
                Cleanup::KeepLogFiles(5),
            ),
        None => logger.log_to_stderr(),
    };
    logger.start().context("logger initialization failed")
}

fn run(args: &RunArgs) -> Result<ExitCode> {
    let mut config = BatchConfig::from_env();
    if let Some(dir) = &args.artifact_dir {
        config = config.with_artifact_dir(dir);
    }
    if args.keep_artifacts {
        config = config.with_keep_artifacts(true);
    }

    let mut runner = BatchRunner::new(config);
    let report = runner
        .run_script(&args.script)
        .with_context(|| format!("cannot run {}", args.script.display()))?;

    for job in &report.jobs {
        if let Outcome::Failed(reason) = &job.outcome {
            println!("line {:>3}  FAILED   {reason}", job.line);
        }
        for region in &job.regions {
            match &region.outcome {
                Outcome::Success => {
                    println!("line {:>3}  SUCCESS  {}", job.line, region.operation);
                    for artifact in &region.artifacts {
                        println!("{:>10}{}", "", artifact.display());
                    }
                }
                Outcome::Failed(reason) => {
                    println!("line {:>3}  FAILED   {}: {reason}", job.line, region.operation);
                }
            }
        }
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _logger = setup_logging(cli.log_level.as_deref(), cli.log_dir.as_ref())?;

    match &cli.command {
        Commands::Run(args) => run(args),
        Commands::Ops => {
            for op in OpRegistry::with_defaults().iter() {
                println!("{}", op.signature());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
