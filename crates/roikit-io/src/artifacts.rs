//! Diagnostic artifact tracker
//!
//! Engines hand their diagnostic snapshots (histogram bars, magnitude
//! spectra) to an [`ArtifactTracker`], which writes each one as a PGM file
//! with a unique name and remembers the path until the caller drains the
//! list with [`ArtifactTracker::pop_all`].
//!
//! File names follow `{prefix}_{unix_seconds}_{6 alphanumerics}.pgm`.

use crate::{IoResult, write_image};
use rand::Rng;
use rand::distr::Alphanumeric;
use roikit_core::PixelBuffer;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the random part of an artifact name
const SUFFIX_LEN: usize = 6;

/// Records diagnostic images under one directory
#[derive(Debug)]
pub struct ArtifactTracker {
    dir: PathBuf,
    pending: Vec<PathBuf>,
}

impl ArtifactTracker {
    /// Create a tracker writing into `dir`. The directory is created on the
    /// first [`record`](Self::record).
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            pending: Vec::new(),
        }
    }

    /// Directory the artifacts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Build a fresh artifact name for `prefix`.
    pub fn artifact_name(prefix: &str) -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!("{prefix}_{secs}_{suffix}.pgm")
    }

    /// Write `buf` as a PGM artifact and track its path.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created, if `buf` is not a
    /// one-channel buffer, or if the file cannot be written.
    pub fn record(&mut self, prefix: &str, buf: &PixelBuffer) -> IoResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(Self::artifact_name(prefix));
        write_image(buf, &path)?;
        log::debug!("artifact written: {}", path.display());
        self.pending.push(path.clone());
        Ok(path)
    }

    /// Paths recorded since the last [`pop_all`](Self::pop_all).
    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    /// Drain the tracking list.
    pub fn pop_all(&mut self) -> Vec<PathBuf> {
        std::mem::take(&mut self.pending)
    }

    /// Delete every file in the directory whose extension matches `ext`
    /// (case-insensitive, without the dot).
    ///
    /// Returns the number of files deleted. A missing directory counts as
    /// empty.
    pub fn delete_with_extension(&self, ext: &str) -> IoResult<usize> {
        let ext = ext.trim_start_matches('.');
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut deleted = 0;
        for entry in entries {
            let path = entry?.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext));
            if matches && path.is_file() {
                fs::remove_file(&path)?;
                deleted += 1;
            }
        }
        log::debug!(
            "deleted {deleted} .{ext} artifact(s) from {}",
            self.dir.display()
        );
        Ok(deleted)
    }
}
