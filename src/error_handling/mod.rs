//! Error handling and run statistics.
//!
//! This module provides:
//! - Error type definitions (initialization, snapshot handling)
//! - Lookup statistics tracking (errors, warnings, info metrics)
//! - Retry strategy configuration
//! - Error categorization from error chains
//!
//! Counters are categorized into:
//! - **Errors**: NCBI lookups that failed
//! - **Warnings**: Skipped rows and data that could not be persisted
//! - **Info**: Where resolved values came from

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_lookup_error, categorize_reqwest_error, get_retry_strategy, update_error_stats,
};
pub use stats::LookupStats;
pub use types::{ErrorType, InfoType, InitializationError, SnapshotError, WarningType};
