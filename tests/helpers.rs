// Shared test helpers for export fixtures and lookup configuration.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::fs;
use std::path::{Path, PathBuf};

use brc_analytics::LookupConfig;

/// Header line of a Plausible top-pages export.
#[allow(dead_code)] // Used by other test files
pub const EXPORT_HEADER: &str = "Page url\tVisitors\tPageviews\tBounce rate\tTime on Page";

/// Writes an export with the standard header followed by `rows`.
#[allow(dead_code)]
pub fn write_export(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = String::from(EXPORT_HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    fs::write(&path, text).expect("Failed to write export fixture");
    path
}

/// Lookup settings that never touch the network.
#[allow(dead_code)]
pub fn offline_lookup(cache_dir: &Path) -> LookupConfig {
    LookupConfig {
        offline: true,
        cache_dir: cache_dir.to_path_buf(),
        ..Default::default()
    }
}

/// Lookup settings pointing both NCBI base URLs at a mock server, without pacing.
#[allow(dead_code)]
pub fn mock_lookup(server_uri: &str, cache_dir: &Path) -> LookupConfig {
    LookupConfig {
        datasets_base_url: server_uri.to_string(),
        eutils_base_url: server_uri.to_string(),
        timeout_seconds: 5,
        request_delay_ms: 0,
        cache_dir: cache_dir.to_path_buf(),
        ..Default::default()
    }
}
