//! Batch runner configuration
//!
//! Defaults can be overridden from the environment with
//! [`BatchConfig::from_env`] and then per field with the `with_*`
//! builders, which is the order the command line applies them in.

use std::path::PathBuf;

/// Environment variable naming the artifact directory
pub const ARTIFACT_DIR_ENV: &str = "ROIKIT_ARTIFACT_DIR";

/// Environment variable that keeps artifacts when set to a true value
pub const KEEP_ARTIFACTS_ENV: &str = "ROIKIT_KEEP_ARTIFACTS";

/// Batch runner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory diagnostic snapshots are written to
    pub artifact_dir: PathBuf,
    /// Keep snapshot files after each region instead of deleting them
    pub keep_artifacts: bool,
    /// Extension of the files removed from `artifact_dir` after each region
    pub artifact_extension: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from("artifacts"),
            keep_artifacts: false,
            artifact_extension: "pgm".to_string(),
        }
    }
}

impl BatchConfig {
    /// Defaults overridden by `ROIKIT_ARTIFACT_DIR` and
    /// `ROIKIT_KEEP_ARTIFACTS`.
    ///
    /// `ROIKIT_KEEP_ARTIFACTS` accepts `1`, `true`, `yes` and `on`, case
    /// insensitively; any other value leaves artifacts to be deleted.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var(ARTIFACT_DIR_ENV)
            && !dir.trim().is_empty()
        {
            config.artifact_dir = PathBuf::from(dir);
        }
        if let Ok(keep) = std::env::var(KEEP_ARTIFACTS_ENV) {
            config.keep_artifacts = parse_flag(&keep);
        }
        config
    }

    pub fn with_artifact_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.artifact_dir = dir.into();
        self
    }

    pub fn with_keep_artifacts(mut self, keep: bool) -> Self {
        self.keep_artifacts = keep;
        self
    }

    pub fn with_artifact_extension(mut self, ext: &str) -> Self {
        self.artifact_extension = ext.trim_start_matches('.').to_string();
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
