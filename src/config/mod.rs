//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (endpoints, delays, retry policy, report layout)
//! - Library configuration structs for each report and maintenance command
//! - Log option types shared with the CLI
//! - The `clap` command-line definition and its mapping onto the config structs

mod cli;
mod constants;
mod types;

pub use cli::{
    AnalyzeArgs, CleanArgs, Cli, Command, LookupArgs, ReportArgs, SummaryArgs, TaxonomyArgs,
};
// Re-export all constants
pub use constants::*;
pub use types::{
    AnalyzeConfig, LogFormat, LogLevel, LookupConfig, ReportConfig, SnapshotConfig,
    SummaryConfig,
};
