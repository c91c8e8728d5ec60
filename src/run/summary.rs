//! Monthly summary command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Local;
use log::{info, warn};

use crate::analysis::{month_files, summarize_month};
use crate::config::SummaryConfig;
use crate::ingest::read_export;
use crate::report::SummaryReport;
use crate::taxonomy::load_snapshot;

use super::write_output;

/// What the summary command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryOutcome {
    /// Months included, oldest first
    pub months: Vec<String>,
    /// Destination file, `None` when printed to stdout
    pub output: Option<PathBuf>,
    /// Snapshot version used for community classification
    pub snapshot_version: Option<String>,
}

/// Builds the monthly traffic summary over every export in `config.data_dir`.
///
/// # Errors
///
/// Fails when the data directory holds no monthly exports, when a requested
/// snapshot version does not exist, or when a file cannot be read or written.
pub async fn run_summary(config: &SummaryConfig) -> Result<SummaryOutcome> {
    let files = month_files(&config.data_dir)?;
    if files.is_empty() {
        bail!(
            "No top-pages-*.tab files found in {}",
            config.data_dir.display()
        );
    }
    info!("Found {} monthly exports in {}", files.len(), config.data_dir.display());

    let snapshot = load_snapshot(&config.cache_dir, config.cache_version.as_deref())
        .context("Failed to load taxonomy snapshot")?;
    match &snapshot.version {
        Some(version) => info!(
            "Using taxonomy snapshot {} ({} taxa, {} assemblies)",
            version,
            snapshot.taxonomy.len(),
            snapshot.assembly.len()
        ),
        None => warn!(
            "No taxonomy snapshot in {}; community tables will count everything as Other",
            config.cache_dir.display()
        ),
    }

    let mut months = Vec::with_capacity(files.len());
    for file in &files {
        let export = read_export(&file.path)?;
        months.push(summarize_month(file, &export.rows, &snapshot));
    }

    let text = SummaryReport {
        months: &months,
        generated: Local::now().naive_local(),
    }
    .to_string();

    match &config.output {
        Some(path) => write_output(path, &text)?,
        None => println!("{}", text),
    }

    Ok(SummaryOutcome {
        months: files.into_iter().map(|f| f.label).collect(),
        output: config.output.clone(),
        snapshot_version: snapshot.version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_month(dir: &std::path::Path, name: &str, body: &str) {
        fs::write(
            dir.join(name),
            format!("Page url\tVisitors\tPageviews\n{}", body),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_run_summary_writes_months_in_order() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        fs::create_dir(&data).unwrap();
        write_month(&data, "top-pages-2025-06-01-to-2025-06-30.tab", "/\t5\t6\n");
        write_month(&data, "top-pages-2025-05-01-to-2025-05-31.tab", "/\t3\t4\n");

        let output = dir.path().join("summary.txt");
        let config = SummaryConfig {
            data_dir: data,
            output: Some(output.clone()),
            cache_dir: dir.path().join("cache"),
            cache_version: None,
        };

        let outcome = run_summary(&config).await.unwrap();
        assert_eq!(outcome.months, vec!["May 2025", "Jun 2025"]);
        assert!(outcome.snapshot_version.is_none());

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.find("May 2025").unwrap() < text.find("Jun 2025").unwrap());
    }

    #[tokio::test]
    async fn test_run_summary_empty_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = SummaryConfig {
            data_dir: dir.path().to_path_buf(),
            cache_dir: dir.path().join("cache"),
            ..Default::default()
        };
        let err = run_summary(&config).await.unwrap_err();
        assert!(err.to_string().contains("No top-pages-*.tab files"));
    }

    #[tokio::test]
    async fn test_run_summary_unknown_snapshot_version() {
        let dir = TempDir::new().unwrap();
        write_month(dir.path(), "top-pages-2025-05-01-to-2025-05-31.tab", "/\t1\t1\n");
        let config = SummaryConfig {
            data_dir: dir.path().to_path_buf(),
            output: Some(dir.path().join("out.txt")),
            cache_dir: dir.path().join("cache"),
            cache_version: Some("2020-01-01_00-00-00".to_string()),
        };
        assert!(run_summary(&config).await.is_err());
    }
}
