//! Taxonomy snapshot refresh command.

use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::app::print_lookup_statistics;
use crate::config::SnapshotConfig;
use crate::error_handling::LookupStats;
use crate::taxonomy::{refresh_snapshot, RefreshOutcome};

/// Brings the taxonomy snapshot up to date with the exports in `config.data_dir`.
///
/// IDs already present in the snapshot are not fetched again unless
/// `force_refresh` is set.
pub async fn run_snapshot(config: &SnapshotConfig) -> Result<RefreshOutcome> {
    let stats = Arc::new(LookupStats::new());
    let outcome = refresh_snapshot(config, Arc::clone(&stats)).await?;

    match &outcome {
        RefreshOutcome::UpToDate { path: Some(path) } => {
            info!("Taxonomy snapshot {} is up to date", path.display())
        }
        RefreshOutcome::UpToDate { path: None } => info!("No IDs found; nothing to snapshot"),
        RefreshOutcome::Created {
            path,
            taxonomy_entries,
            assembly_entries,
        } => info!(
            "Saved taxonomy snapshot {} ({} taxa, {} assemblies)",
            path.display(),
            taxonomy_entries,
            assembly_entries
        ),
    }

    print_lookup_statistics(&stats);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LookupConfig;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_snapshot_empty_data_dir_is_up_to_date() {
        let dir = TempDir::new().unwrap();
        let config = SnapshotConfig {
            data_dir: dir.path().to_path_buf(),
            lookup: LookupConfig {
                offline: true,
                cache_dir: dir.path().join("cache"),
                ..Default::default()
            },
            ..Default::default()
        };

        let outcome = run_snapshot(&config).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::UpToDate { path: None });
    }

    #[tokio::test]
    async fn test_run_snapshot_offline_with_missing_ids_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("top-pages-2025-05-01-to-2025-05-31.tab"),
            "Page url\tVisitors\tPageviews\n/data/organisms/5833\t1\t1\n",
        )
        .unwrap();
        let config = SnapshotConfig {
            data_dir: dir.path().to_path_buf(),
            lookup: LookupConfig {
                offline: true,
                cache_dir: dir.path().join("cache"),
                ..Default::default()
            },
            ..Default::default()
        };

        assert!(run_snapshot(&config).await.is_err());
    }
}
