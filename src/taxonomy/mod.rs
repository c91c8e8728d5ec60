//! NCBI taxonomy lookups.
//!
//! This module provides:
//! - A rate-limited, retrying NCBI client (Datasets v2 and E-utilities)
//! - Name resolution with an in-process memo and an on-disk lookup cache
//! - Versioned taxonomy snapshots used by the monthly summary
//! - Research community classification of lineages

pub mod accession;
mod cache;
mod client;
mod community;
mod resolver;
mod snapshot;
mod types;

pub use cache::{LookupCache, LookupKind};
pub use client::NcbiClient;
pub use community::{community_of, Community};
pub use resolver::NameResolver;
pub use snapshot::{
    load_snapshot, refresh_snapshot, save_snapshot, scan_ids, snapshot_path, source_hash,
    AssemblyRecord, RefreshOutcome, TaxonRecord, TaxonomySnapshot, LEGACY_VERSION,
};
pub use types::{AssemblyTaxonomy, TaxonLineage};
