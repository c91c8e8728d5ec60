//! Export cleaning command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::ingest::{clean_export, cleaned_output_path};

use super::write_output;

/// What the clean command wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    /// Destination of the cleaned export
    pub output: PathBuf,
    /// Data rows written
    pub rows: usize,
    /// Lines that could not be recognised
    pub dropped: usize,
}

/// Rewrites a raw export into the canonical tab-separated layout.
///
/// `output` defaults to `<stem>-cleaned<ext>` beside the input.
pub fn run_clean(input: &Path, output: Option<&Path>) -> Result<CleanReport> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let cleaned = clean_export(&text);

    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| cleaned_output_path(input));
    write_output(&output, &cleaned.text)?;

    if cleaned.dropped > 0 {
        warn!("Dropped {} unrecognised line(s) from {}", cleaned.dropped, input.display());
    }
    info!("Cleaned {} rows into {}", cleaned.rows, output.display());

    Ok(CleanReport {
        output,
        rows: cleaned.rows,
        dropped: cleaned.dropped,
    })
}
