//! Analytics export ingestion.
//!
//! Exports are tab-separated with a header line followed by one row per page:
//! `Page url, Visitors, Pageviews, Bounce rate, Time on Page`. Rows that do not
//! carry a URL plus integer visitor and pageview counts are skipped and counted.

mod clean;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::utils::compile_regex_unsafe;

pub use clean::{clean_export, cleaned_output_path, CleanedExport, CANONICAL_HEADER};

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| compile_regex_unsafe(r"([0-9]+)h", "HOURS_RE"));
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"([0-9]+)m", "MINUTES_RE"));
static SECONDS_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"([0-9]+)s", "SECONDS_RE"));

/// Minimum number of tab-separated fields for a usable row.
const MIN_FIELDS: usize = 3;

/// One page entry of an analytics export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRow {
    /// Site path, e.g. `/data/organisms/5833`
    pub url: String,
    /// Unique visitors
    pub visitors: u64,
    /// Total pageviews
    pub pageviews: u64,
    /// Bounce rate in percent, when the export records one
    pub bounce_rate: Option<u32>,
    /// Average time on page in seconds (`None` for `-`)
    pub time_on_page: Option<u64>,
}

/// A parsed export file.
#[derive(Debug, Clone, Default)]
pub struct ExportFile {
    /// Rows in file order
    pub rows: Vec<PageRow>,
    /// Non-blank lines that could not be parsed into a row
    pub skipped: usize,
}

/// Converts a duration such as `7m 38s`, `17s` or `1h 2m` to seconds.
///
/// Returns `None` for an empty string or `-`. Text without any recognised
/// unit counts as zero seconds.
pub fn parse_time_on_page(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() || text == "-" {
        return None;
    }

    let unit = |re: &Regex, scale: u64| -> u64 {
        re.captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .map(|n| n * scale)
            .unwrap_or(0)
    };

    Some(unit(&HOURS_RE, 3600) + unit(&MINUTES_RE, 60) + unit(&SECONDS_RE, 1))
}

/// Parses a bounce rate such as `45%` or `45`.
pub fn parse_bounce_rate(text: &str) -> Option<u32> {
    let text = text.trim();
    text.strip_suffix('%').unwrap_or(text).trim().parse().ok()
}

fn parse_row(line: &str) -> Option<PageRow> {
    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < MIN_FIELDS || fields[0].is_empty() {
        return None;
    }

    Some(PageRow {
        url: fields[0].to_string(),
        visitors: fields[1].parse().ok()?,
        pageviews: fields[2].parse().ok()?,
        bounce_rate: fields.get(3).and_then(|f| parse_bounce_rate(f)),
        time_on_page: fields.get(4).and_then(|f| parse_time_on_page(f)),
    })
}

/// Parses an export from any buffered reader.
///
/// The first line is the header and is always skipped. Blank lines are
/// ignored; other lines that do not form a row are counted in `skipped`.
///
/// # Errors
///
/// Returns an error only if reading from `reader` fails.
pub fn parse_export<R: BufRead>(reader: R) -> Result<ExportFile> {
    let mut export = ExportFile::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read export line")?;
        if index == 0 {
            continue;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line) {
            Some(row) => export.rows.push(row),
            None => {
                log::debug!("Skipping malformed export line {}: {:?}", index + 1, line);
                export.skipped += 1;
            }
        }
    }

    Ok(export)
}

/// Opens and parses the export at `path`.
pub fn read_export(path: &Path) -> Result<ExportFile> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open export file {}", path.display()))?;
    let export = parse_export(BufReader::new(file))
        .with_context(|| format!("Failed to parse export file {}", path.display()))?;

    if export.skipped > 0 {
        log::warn!(
            "Skipped {} malformed line(s) in {}",
            export.skipped,
            path.display()
        );
    }
    log::debug!("Read {} rows from {}", export.rows.len(), path.display());
    Ok(export)
}
