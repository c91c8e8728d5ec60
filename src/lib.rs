//! brc_analytics library: traffic reports for BRC Analytics exports
//!
//! This library turns tab-separated Plausible "top pages" exports into text and
//! HTML reports. Page URLs are classified into organism, assembly, workflow and
//! priority-pathogen pages, organism names are resolved through NCBI (with a
//! rate limiter, an on-disk cache and offline fallbacks), and a versioned
//! taxonomy snapshot drives the month-by-month community summary.
//!
//! # Example
//!
//! ```no_run
//! use brc_analytics::{run_organisms, ReportConfig};
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ReportConfig {
//!     input: PathBuf::from("top-pages-2025-05-01-to-2025-05-31.tab"),
//!     html_output: Some(PathBuf::from("organisms.html")),
//!     ..Default::default()
//! };
//!
//! let outcome = run_organisms(&config).await?;
//! println!("Wrote {:?}", outcome.text_path);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Commands that resolve names require a Tokio runtime. Use `#[tokio::main]`
//! in your application or call them from within an async context.

#![warn(missing_docs)]

mod analysis;
mod app;
mod classify;
pub mod config;
pub mod error_handling;
pub mod ingest;
pub mod initialization;
mod report;
mod run;
pub mod taxonomy;
mod utils;

// Re-export public API
pub use config::{
    AnalyzeConfig, LogFormat, LogLevel, LookupConfig, ReportConfig, SnapshotConfig,
    SummaryConfig,
};
pub use error_handling::LookupStats;
pub use run::{
    derived_output_path, run_analyze, run_clean, run_organisms, run_snapshot, run_summary,
    run_workflows, AnalyzeReport, CleanReport, ReportOutcome, SummaryOutcome,
};
pub use taxonomy::RefreshOutcome;
