//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_CACHE_DIR, DEFAULT_DATASETS_BASE_URL, DEFAULT_DATA_DIR, DEFAULT_EUTILS_BASE_URL,
    DEFAULT_OUTPUT_DIR, DEFAULT_REQUEST_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    FIRST_IN_LIST_BIASED_ASSEMBLIES, TOP_LIMIT,
};
use crate::config::types::{
    AnalyzeConfig, LogFormat, LogLevel, LookupConfig, ReportConfig, SnapshotConfig,
    SummaryConfig,
};

/// Traffic reports for BRC Analytics Plausible exports.
#[derive(Debug, Parser)]
#[command(name = "brc_analytics", version, about)]
pub struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain or json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,

    /// NCBI lookup options
    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command that talks to NCBI.
#[derive(Debug, Args)]
pub struct LookupArgs {
    /// NCBI API key
    #[arg(long, env = "NCBI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// NCBI Datasets v2 base URL
    #[arg(long, env = "NCBI_DATASETS_URL", default_value = DEFAULT_DATASETS_BASE_URL, global = true)]
    pub datasets_url: String,

    /// NCBI E-utilities base URL
    #[arg(long, env = "NCBI_EUTILS_URL", default_value = DEFAULT_EUTILS_BASE_URL, global = true)]
    pub eutils_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_seconds: u64,

    /// Minimum delay between NCBI requests in milliseconds (0 disables pacing)
    #[arg(long, default_value_t = DEFAULT_REQUEST_DELAY_MS, global = true)]
    pub request_delay_ms: u64,

    /// Directory for the lookup cache and taxonomy snapshots
    #[arg(long, default_value = DEFAULT_CACHE_DIR, global = true)]
    pub cache_dir: PathBuf,

    /// Neither read nor write the on-disk lookup cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Never call NCBI; unresolved names are reported as Unknown
    #[arg(long, global = true)]
    pub offline: bool,
}

impl LookupArgs {
    /// Library lookup settings for these options.
    pub fn to_config(&self) -> LookupConfig {
        LookupConfig {
            datasets_base_url: self.datasets_url.clone(),
            eutils_base_url: self.eutils_url.clone(),
            api_key: self.api_key.clone(),
            timeout_seconds: self.timeout_seconds,
            request_delay_ms: self.request_delay_ms,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_dir: self.cache_dir.clone(),
            use_cache: !self.no_cache,
            offline: self.offline,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Organism, pathogen and assembly page report
    Organisms(ReportArgs),
    /// Workflow configuration page report
    Workflows(ReportArgs),
    /// Both reports for one export, written into a directory
    Analyze(AnalyzeArgs),
    /// Month-by-month traffic summary over every export in a directory
    Summary(SummaryArgs),
    /// Build or update the versioned taxonomy snapshot
    Taxonomy(TaxonomyArgs),
    /// Repair a copy-pasted export into clean tab-separated rows
    Clean(CleanArgs),
}

/// Options for a single report.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Tab-separated export file
    pub input: PathBuf,

    /// Text report path (default: `<input stem>-<kind>-analysis.txt` beside the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write an HTML report to this path
    #[arg(long)]
    pub html: Option<PathBuf>,

    /// Rows shown in the top-N tables
    #[arg(long, default_value_t = TOP_LIMIT)]
    pub top: usize,
}

impl ReportArgs {
    /// Report settings for these options.
    pub fn into_config(self, lookup: LookupConfig) -> ReportConfig {
        ReportConfig {
            input: self.input,
            output: self.output,
            html_output: self.html,
            biased_assemblies: biased_assemblies(),
            top_limit: self.top,
            lookup,
        }
    }
}

/// Options for `analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Tab-separated export file
    pub input: PathBuf,

    /// Directory receiving the reports
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Also write HTML reports
    #[arg(long)]
    pub html: bool,

    /// Rows shown in the top-N tables
    #[arg(long, default_value_t = TOP_LIMIT)]
    pub top: usize,
}

impl AnalyzeArgs {
    /// Analyze settings for these options.
    pub fn into_config(self, lookup: LookupConfig) -> AnalyzeConfig {
        AnalyzeConfig {
            report: ReportConfig {
                input: self.input,
                output: None,
                html_output: None,
                biased_assemblies: biased_assemblies(),
                top_limit: self.top,
                lookup,
            },
            output_dir: self.output_dir,
            html: self.html,
        }
    }
}

/// Options for `summary`.
#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Directory holding `top-pages-*.tab` exports
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Write the summary here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Taxonomy snapshot version to use (default: latest)
    #[arg(long)]
    pub cache_version: Option<String>,
}

impl SummaryArgs {
    /// Summary settings; snapshots are read from `lookup.cache_dir`.
    pub fn into_config(self, lookup: &LookupConfig) -> SummaryConfig {
        SummaryConfig {
            data_dir: self.data_dir,
            output: self.output,
            cache_dir: lookup.cache_dir.clone(),
            cache_version: self.cache_version,
        }
    }
}

/// Options for `taxonomy`.
#[derive(Debug, Args)]
pub struct TaxonomyArgs {
    /// Directory holding `top-pages-*.tab` exports
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Snapshot version to start from (default: latest)
    #[arg(long)]
    pub cache_version: Option<String>,

    /// Re-fetch every ID into a fresh snapshot
    #[arg(long)]
    pub force_refresh: bool,
}

impl TaxonomyArgs {
    /// Snapshot settings for these options.
    pub fn into_config(self, lookup: LookupConfig) -> SnapshotConfig {
        SnapshotConfig {
            data_dir: self.data_dir,
            cache_version: self.cache_version,
            force_refresh: self.force_refresh,
            lookup,
        }
    }
}

/// Options for `clean`.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Raw export
    pub input: PathBuf,

    /// Destination (default: `<stem>-cleaned<ext>` beside the input)
    pub output: Option<PathBuf>,
}

fn biased_assemblies() -> Vec<String> {
    FIRST_IN_LIST_BIASED_ASSEMBLIES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lookup_flags_map_to_config() {
        let cli = Cli::try_parse_from([
            "brc_analytics",
            "--no-cache",
            "--offline",
            "--cache-dir",
            "/tmp/cache",
            "organisms",
            "export.tab",
        ])
        .unwrap();
        let config = cli.lookup.to_config();
        assert!(!config.use_cache);
        assert!(config.offline);
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn test_summary_uses_lookup_cache_dir() {
        let cli = Cli::try_parse_from([
            "brc_analytics",
            "summary",
            "--cache-dir",
            "snapshots",
        ])
        .unwrap();
        let lookup = cli.lookup.to_config();
        match cli.command {
            Command::Summary(args) => {
                let config = args.into_config(&lookup);
                assert_eq!(config.cache_dir, PathBuf::from("snapshots"));
                assert_eq!(config.data_dir, PathBuf::from(DEFAULT_DATA_DIR));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
