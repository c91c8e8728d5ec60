//! Command orchestration.
//!
//! Each `run_*` function drives one CLI command end to end: read inputs,
//! resolve names, render, write outputs, and report what was produced.

mod clean;
mod reports;
mod snapshot;
mod summary;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use clean::{run_clean, CleanReport};
pub use reports::{run_analyze, run_organisms, run_workflows, AnalyzeReport, ReportOutcome};
pub use snapshot::run_snapshot;
pub use summary::{run_summary, SummaryOutcome};

/// `<stem><suffix>` beside `input`, or inside `dir` when given.
pub fn derived_output_path(input: &Path, suffix: &str, dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{}{}", stem, suffix);
    match dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// Writes `contents` to `path`, creating parent directories first.
pub(crate) fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
