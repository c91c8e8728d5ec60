//! On-disk lookup cache.
//!
//! Each successful lookup is stored as `<cache_dir>/lookups/<kind>-<id>.json`
//! together with the time it was cached. Entries older than the TTL are
//! deleted when read.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::LOOKUP_CACHE_TTL_SECS;

/// Subdirectory of the cache directory holding lookup entries.
const LOOKUP_SUBDIR: &str = "lookups";

/// Kinds of cached lookups; each kind has its own file name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    /// Organism name of a tax ID
    TaxonName,
    /// Organism name of an assembly accession
    AssemblyName,
    /// Assembly accessions listed for a tax ID
    TaxonAssemblies,
}

impl LookupKind {
    fn prefix(&self) -> &'static str {
        match self {
            LookupKind::TaxonName => "taxon-name",
            LookupKind::AssemblyName => "assembly-name",
            LookupKind::TaxonAssemblies => "taxon-assemblies",
        }
    }
}

/// A cached lookup result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LookupCacheEntry<T> {
    pub(crate) key: String,
    pub(crate) value: T,
    pub(crate) cached_at: SystemTime,
}

/// Per-entry JSON cache with a time-to-live.
#[derive(Debug, Clone)]
pub struct LookupCache {
    dir: PathBuf,
    ttl: Duration,
}

impl LookupCache {
    /// Cache rooted at `<cache_dir>/lookups` with the default 30-day TTL.
    pub fn new(cache_dir: &Path) -> Self {
        Self::with_ttl(cache_dir, Duration::from_secs(LOOKUP_CACHE_TTL_SECS))
    }

    /// Cache rooted at `<cache_dir>/lookups` with a custom TTL.
    pub fn with_ttl(cache_dir: &Path, ttl: Duration) -> Self {
        LookupCache {
            dir: cache_dir.join(LOOKUP_SUBDIR),
            ttl,
        }
    }

    fn entry_path(&self, kind: LookupKind, id: &str) -> PathBuf {
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}-{}.json", kind.prefix(), safe_id))
    }

    /// Loads a fresh entry, deleting it if it has expired.
    pub fn load<T: DeserializeOwned>(&self, kind: LookupKind, id: &str) -> Result<Option<T>> {
        let cache_file = self.entry_path(kind, id);
        if !cache_file.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&cache_file)
            .with_context(|| format!("Failed to read cache file {}", cache_file.display()))?;
        let entry: LookupCacheEntry<T> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache file {}", cache_file.display()))?;

        let age = entry.cached_at.elapsed().unwrap_or_default();
        if age > self.ttl {
            log::debug!("Lookup cache entry {} expired", cache_file.display());
            let _ = std::fs::remove_file(&cache_file);
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    /// Stores a lookup result.
    pub fn save<T: Serialize>(&self, kind: LookupKind, id: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create lookup cache directory")?;

        let entry = LookupCacheEntry {
            key: id.to_string(),
            value,
            cached_at: SystemTime::now(),
        };
        let content =
            serde_json::to_string_pretty(&entry).context("Failed to serialize cache entry")?;
        std::fs::write(self.entry_path(kind, id), content).context("Failed to write cache file")?;

        Ok(())
    }
}
