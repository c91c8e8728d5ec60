//! Normalisation of raw Plausible exports.
//!
//! Copy-pasted exports arrive in several broken shapes: the URL on one line
//! and its metrics on the next, metrics separated by spaces, or a space in
//! place of the TAB after the URL. Cleaning rewrites every recognisable entry
//! as `url\tvisitors\tpageviews\tbounce\ttime` under the canonical header.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::compile_regex_unsafe;

/// Header line written at the top of every cleaned export.
pub const CANONICAL_HEADER: &str = "Page url\tVisitors\tPageviews\tBounce rate\tTime on Page";

/// Number of fields in a complete export row.
const ROW_FIELDS: usize = 5;

static URL_SPACE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"(/[^\s]+) ([0-9]+)", "URL_SPACE_NUMBER_RE")
});
static SPACED_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"^(/\S+)\s+(\d+)\s+(\d+)\s+(\S+)(?:\s+(.*))?$",
        "SPACED_ROW_RE",
    )
});

/// Result of cleaning an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedExport {
    /// Cleaned file contents, header included, newline-terminated
    pub text: String,
    /// Data rows written
    pub rows: usize,
    /// Input lines (or URL/metrics line pairs) that were dropped
    pub dropped: usize,
}

/// Default destination for a cleaned export: `<stem>-cleaned<ext>` beside the input.
pub fn cleaned_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}-cleaned.{}", stem, ext.to_string_lossy()),
        None => format!("{}-cleaned", stem),
    };
    input.with_file_name(name)
}

fn time_or_dash(time: &str) -> &str {
    let time = time.trim();
    if time.is_empty() {
        "-"
    } else {
        time
    }
}

fn format_row(url: &str, visitors: &str, pageviews: &str, bounce: &str, time: &str) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        url.trim(),
        visitors.trim(),
        pageviews.trim(),
        bounce.trim(),
        time_or_dash(time)
    )
}

/// A metrics line starts with a digit, or carries TABs without being a URL itself.
fn is_metrics_line(line: &str) -> bool {
    line.starts_with(|c: char| c.is_ascii_digit()) || (line.contains('\t') && !line.starts_with('/'))
}

/// Parses the metrics line that follows a URL line.
fn metrics_row(url: &str, metrics: &str) -> Option<String> {
    let tab_parts: Vec<&str> = metrics.split('\t').collect();
    if tab_parts.len() >= 4 {
        return Some(format_row(
            url,
            tab_parts[0],
            tab_parts[1],
            tab_parts[2],
            tab_parts[3],
        ));
    }

    let parts: Vec<&str> = metrics.split_whitespace().collect();
    if parts.len() >= 3 {
        let time = parts[3..].join(" ");
        return Some(format_row(url, parts[0], parts[1], parts[2], &time));
    }
    None
}

/// Normalises a single-line entry that already carries TABs.
fn tabbed_row(line: &str) -> Option<String> {
    let complete = |candidate: &str| -> Option<String> {
        let parts: Vec<&str> = candidate.split('\t').map(str::trim).collect();
        (parts.len() >= ROW_FIELDS).then(|| parts.join("\t"))
    };

    complete(line).or_else(|| {
        let fixed = URL_SPACE_NUMBER_RE.replace_all(line, "$1\t$2");
        complete(&fixed)
    })
}

fn spaced_row(line: &str) -> Option<String> {
    let caps = SPACED_ROW_RE.captures(line)?;
    Some(format_row(
        &caps[1],
        &caps[2],
        &caps[3],
        &caps[4],
        caps.get(5).map_or("", |m| m.as_str()),
    ))
}

/// Cleans raw export text into the canonical tab-separated layout.
///
/// The first non-blank line, and any line starting with `Page url`, is a
/// header and is replaced by [`CANONICAL_HEADER`]. Lines that cannot be
/// recognised are dropped and counted.
pub fn clean_export(text: &str) -> CleanedExport {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let mut out = vec![CANONICAL_HEADER.to_string()];
    let mut dropped = 0usize;
    let mut seen_first = false;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if line.is_empty() {
            i += 1;
            continue;
        }

        if !seen_first || line.starts_with("Page url") {
            seen_first = true;
            i += 1;
            continue;
        }

        if line.starts_with('/') {
            if let Some(next) = lines.get(i + 1).filter(|n| !n.is_empty() && is_metrics_line(n)) {
                match metrics_row(line, next) {
                    Some(row) => out.push(row),
                    None => dropped += 1,
                }
                i += 2;
                continue;
            }
        }

        let row = if line.contains('\t') {
            tabbed_row(line)
        } else if line.starts_with('/') {
            spaced_row(line)
        } else {
            None
        };

        match row {
            Some(row) => out.push(row),
            None => {
                log::debug!("Dropping unrecognised export line: {:?}", line);
                dropped += 1;
            }
        }
        i += 1;
    }

    let rows = out.len() - 1;
    let mut text = out.join("\n");
    text.push('\n');

    CleanedExport {
        text,
        rows,
        dropped,
    }
}
