//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and library configuration.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_DATASETS_BASE_URL, DEFAULT_DATA_DIR, DEFAULT_EUTILS_BASE_URL,
    DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    FIRST_IN_LIST_BIASED_ASSEMBLIES, TOP_LIMIT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Settings for NCBI lookups, shared by every command that resolves names.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// NCBI Datasets v2 base URL (no trailing slash)
    pub datasets_base_url: String,
    /// NCBI E-utilities base URL (no trailing slash)
    pub eutils_base_url: String,
    /// Optional NCBI API key (raises the allowed request rate)
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Minimum delay between requests in milliseconds (0 disables pacing)
    pub request_delay_ms: u64,
    /// HTTP User-Agent header value
    pub user_agent: String,
    /// Directory holding lookup cache entries and taxonomy snapshots
    pub cache_dir: PathBuf,
    /// Read and write the on-disk lookup cache
    pub use_cache: bool,
    /// Never touch the network; unresolved names become "Unknown"
    pub offline: bool,
}

impl LookupConfig {
    /// Requests per second implied by `request_delay_ms` (0.0 when pacing is off).
    pub fn requests_per_second(&self) -> f64 {
        if self.request_delay_ms == 0 {
            0.0
        } else {
            1000.0 / self.request_delay_ms as f64
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            datasets_base_url: DEFAULT_DATASETS_BASE_URL.to_string(),
            eutils_base_url: DEFAULT_EUTILS_BASE_URL.to_string(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            use_cache: true,
            offline: false,
        }
    }
}

/// Configuration for the organism and workflow reports.
///
/// # Examples
///
/// ```no_run
/// use brc_analytics::ReportConfig;
/// use std::path::PathBuf;
///
/// let config = ReportConfig {
///     input: PathBuf::from("top-pages-2025-05-01-to-2025-05-31.tab"),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Tab-separated export to analyze
    pub input: PathBuf,
    /// Text report destination (derived from `input` when `None`)
    pub output: Option<PathBuf>,
    /// Optional HTML report destination
    pub html_output: Option<PathBuf>,
    /// Assemblies flagged with the first-in-list bias marker
    pub biased_assemblies: Vec<String>,
    /// Rows shown in the "top N" tables
    pub top_limit: usize,
    /// NCBI lookup settings
    pub lookup: LookupConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("top-pages.tab"),
            output: None,
            html_output: None,
            biased_assemblies: FIRST_IN_LIST_BIASED_ASSEMBLIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            top_limit: TOP_LIMIT,
            lookup: LookupConfig::default(),
        }
    }
}

/// Configuration for writing both reports of one export into a directory.
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Export, limits and lookup settings (`output` and `html_output` are ignored)
    pub report: ReportConfig,
    /// Directory receiving every generated file
    pub output_dir: PathBuf,
    /// Also write HTML versions of both reports
    pub html: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            report: ReportConfig::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            html: false,
        }
    }
}

/// Configuration for the monthly summary report.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Directory scanned for `top-pages-*.tab` files
    pub data_dir: PathBuf,
    /// Destination file (stdout when `None`)
    pub output: Option<PathBuf>,
    /// Directory holding taxonomy snapshots
    pub cache_dir: PathBuf,
    /// Snapshot version to use instead of the latest one
    pub cache_version: Option<String>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            output: None,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_version: None,
        }
    }
}

/// Configuration for refreshing the taxonomy snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Directory scanned for `top-pages-*.tab` files
    pub data_dir: PathBuf,
    /// Snapshot version to start from instead of the latest one
    pub cache_version: Option<String>,
    /// Re-fetch every ID into a fresh snapshot
    pub force_refresh: bool,
    /// NCBI lookup settings (`cache_dir` locates the snapshots)
    pub lookup: LookupConfig,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_version: None,
            force_refresh: false,
            lookup: LookupConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_log_format_debug() {
        assert_eq!(format!("{:?}", LogFormat::Plain), "Plain");
        assert_eq!(format!("{:?}", LogFormat::Json), "Json");
    }

    #[test]
    fn test_lookup_config_default() {
        let config = LookupConfig::default();
        assert_eq!(config.request_delay_ms, 350);
        assert_eq!(config.timeout_seconds, 10);
        assert!(config.use_cache);
        assert!(!config.offline);
        assert!(config.api_key.is_none());
        assert_eq!(config.cache_dir, PathBuf::from(".taxonomy_cache"));
    }

    #[test]
    fn test_requests_per_second() {
        let mut config = LookupConfig {
            request_delay_ms: 500,
            ..Default::default()
        };
        assert!((config.requests_per_second() - 2.0).abs() < f64::EPSILON);

        config.request_delay_ms = 0;
        assert_eq!(config.requests_per_second(), 0.0);
    }

    #[test]
    fn test_report_config_default_biased_assemblies() {
        let config = ReportConfig::default();
        assert_eq!(config.top_limit, 20);
        assert!(config
            .biased_assemblies
            .contains(&"GCA_001008285_1".to_string()));
        assert!(config
            .biased_assemblies
            .contains(&"GCA_000826245_1".to_string()));
    }
}
