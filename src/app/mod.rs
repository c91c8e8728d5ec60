//! Main application helpers.
//!
//! This module provides the end-of-run statistics printing shared by every
//! command that talks to NCBI.

pub mod statistics;

// Re-export public API
pub use statistics::print_lookup_statistics;
