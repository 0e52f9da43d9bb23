//! Batch script parsing
//!
//! A script holds one job per line:
//!
//! ```text
//! source target count {start_x start_y total_x total_y operation params...}*
//! ```
//!
//! `count` is the number of region blocks that follow. The number of
//! parameters after each operation name comes from the registry, so an
//! unknown operation makes the rest of the line unparseable. Blank lines
//! and lines starting with `#` are skipped.
//!
//! Parameters are kept as raw tokens here; they are converted when the
//! region runs, so a bad value fails that region only.

use crate::registry::OpRegistry;
use crate::{BatchError, BatchResult};
use std::path::{Path, PathBuf};

/// One region block of a job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionJob {
    pub start_x: usize,
    pub start_y: usize,
    pub total_x: usize,
    pub total_y: usize,
    pub operation: String,
    pub args: Vec<String>,
}

/// One script line: a source image, a target path and its regions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// 1-based script line number
    pub line: usize,
    pub source: PathBuf,
    pub target: PathBuf,
    pub regions: Vec<RegionJob>,
}

impl Job {
    /// Resolve relative source and target paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if self.source.is_relative() {
            self.source = base.join(&self.source);
        }
        if self.target.is_relative() {
            self.target = base.join(&self.target);
        }
    }
}

struct Cursor<'t> {
    line: usize,
    tokens: std::slice::Iter<'t, &'t str>,
}

impl<'t> Cursor<'t> {
    fn next(&mut self, what: &str) -> BatchResult<&'t str> {
        self.tokens.next().copied().ok_or_else(|| BatchError::Parse {
            line: self.line,
            message: format!("missing {what}"),
        })
    }

    fn number(&mut self, what: &str) -> BatchResult<usize> {
        let token = self.next(what)?;
        token.parse().map_err(|_| BatchError::Parse {
            line: self.line,
            message: format!("{what} must be a non-negative integer, got {token:?}"),
        })
    }
}

/// Parse one script line.
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// - [`BatchError::Parse`] for missing or malformed tokens, or tokens
///   left over after the last region
/// - [`BatchError::NotFound`] for an operation the registry lacks
pub fn parse_line(line: usize, text: &str, registry: &OpRegistry) -> BatchResult<Option<Job>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let mut cursor = Cursor {
        line,
        tokens: tokens.iter(),
    };

    let source = PathBuf::from(cursor.next("source image")?);
    let target = PathBuf::from(cursor.next("target image")?);
    let count = cursor.number("region count")?;

    let mut regions = Vec::with_capacity(count);
    for _ in 0..count {
        let start_x = cursor.number("start_x")?;
        let start_y = cursor.number("start_y")?;
        let total_x = cursor.number("total_x")?;
        let total_y = cursor.number("total_y")?;
        let operation = cursor.next("operation name")?.to_string();
        let arity = registry.lookup(&operation)?.arity();
        let mut args = Vec::with_capacity(arity);
        for i in 0..arity {
            args.push(cursor.next(&format!("parameter {} of {operation}", i + 1))?.to_string());
        }
        regions.push(RegionJob {
            start_x,
            start_y,
            total_x,
            total_y,
            operation,
            args,
        });
    }

    let rest = cursor.tokens.len();
    if rest > 0 {
        return Err(BatchError::Parse {
            line,
            message: format!("{rest} unexpected token(s) after the last region"),
        });
    }

    Ok(Some(Job {
        line,
        source,
        target,
        regions,
    }))
}

/// Parse every line of a script, keeping per-line failures.
pub fn parse_script(text: &str, registry: &OpRegistry) -> Vec<BatchResult<Job>> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(i + 1, line, registry).transpose())
        .collect()
}
