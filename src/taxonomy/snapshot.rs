//! Versioned taxonomy snapshots.
//!
//! A snapshot maps every tax ID and assembly seen in the monthly exports to a
//! name and lineage. Each refresh writes `cache_<version>.json` and points
//! `latest.json` at it, so earlier summaries stay reproducible.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use anyhow::{bail, Context, Result};
use chrono::Local;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::{SnapshotConfig, PROGRESS_LOG_INTERVAL, UNKNOWN};
use crate::error_handling::{update_error_stats, LookupStats, SnapshotError};
use crate::utils::compile_regex_unsafe;

use super::client::NcbiClient;

/// Name of the pointer to the newest snapshot.
const LATEST_FILE: &str = "latest.json";
/// Version reported for snapshots written before versioning existed.
pub const LEGACY_VERSION: &str = "legacy";

static SNAPSHOT_ORGANISM_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"^/data/organisms/(\d+)$", "SNAPSHOT_ORGANISM_RE")
});
static SNAPSHOT_ASSEMBLY_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"^/data/assemblies/([^/]+)", "SNAPSHOT_ASSEMBLY_RE")
});

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Cached name and lineage of a taxon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonRecord {
    /// Scientific name
    #[serde(default = "unknown")]
    pub name: String,
    /// Semicolon-separated lineage
    #[serde(default = "unknown")]
    pub lineage: String,
    /// Local time of the lookup
    #[serde(default)]
    pub fetched_at: Option<String>,
    /// Why the lookup failed, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cached organism of an assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyRecord {
    /// Tax ID of the assembly's organism
    #[serde(default)]
    pub tax_id: Option<String>,
    /// Organism name
    #[serde(default = "unknown")]
    pub name: String,
    /// Lineage copied from the organism's taxon record
    #[serde(default = "unknown")]
    pub lineage: String,
    /// Local time of the lookup
    #[serde(default)]
    pub fetched_at: Option<String>,
    /// Why the lookup failed, when it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomySnapshot {
    /// `YYYY-MM-DD_HH-MM-SS`, `legacy` for files written without one, `None` when empty
    pub version: Option<String>,
    /// Local time the snapshot was saved
    pub created: Option<String>,
    /// [`source_hash`] of the IDs the snapshot was built from
    pub source_data_hash: Option<String>,
    /// Keyed by tax ID
    pub taxonomy: BTreeMap<String, TaxonRecord>,
    /// Keyed by assembly accession in site spelling
    pub assembly: BTreeMap<String, AssemblyRecord>,
}

impl TaxonomySnapshot {
    /// Lineage of a taxon, `Unknown` when absent.
    pub fn taxon_lineage(&self, tax_id: &str) -> &str {
        self.taxonomy
            .get(tax_id)
            .map(|r| r.lineage.as_str())
            .unwrap_or(UNKNOWN)
    }

    /// Lineage of an assembly's organism, `Unknown` when absent.
    pub fn assembly_lineage(&self, accession: &str) -> &str {
        self.assembly
            .get(accession)
            .map(|r| r.lineage.as_str())
            .unwrap_or(UNKNOWN)
    }

    /// Name of a taxon, `Unknown` when absent.
    pub fn taxon_name(&self, tax_id: &str) -> &str {
        self.taxonomy
            .get(tax_id)
            .map(|r| r.name.as_str())
            .unwrap_or(UNKNOWN)
    }

    /// Organism name of an assembly, `Unknown` when absent.
    pub fn assembly_name(&self, accession: &str) -> &str {
        self.assembly
            .get(accession)
            .map(|r| r.name.as_str())
            .unwrap_or(UNKNOWN)
    }

    /// Copies each assembly's lineage from its taxon when the taxon is known.
    pub fn fill_assembly_lineages(&mut self) {
        for record in self.assembly.values_mut() {
            if let Some(taxon) = record
                .tax_id
                .as_ref()
                .and_then(|tax_id| self.taxonomy.get(tax_id))
            {
                record.lineage = taxon.lineage.clone();
            }
        }
    }
}

/// Locates a snapshot file.
///
/// A requested version must exist. Otherwise `latest.json` is used, then the
/// newest `cache_*.json`; `None` when the directory holds no snapshot.
pub fn snapshot_path(
    cache_dir: &Path,
    version: Option<&str>,
) -> Result<Option<PathBuf>, SnapshotError> {
    if let Some(version) = version {
        let path = cache_dir.join(format!("cache_{}.json", version));
        if !path.exists() {
            return Err(SnapshotError::VersionNotFound(version.to_string()));
        }
        return Ok(Some(path));
    }

    let latest = cache_dir.join(LATEST_FILE);
    if latest.exists() {
        return Ok(Some(latest));
    }

    if !cache_dir.is_dir() {
        return Ok(None);
    }
    let mut versions: Vec<PathBuf> = fs::read_dir(cache_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("cache_") && n.ends_with(".json"))
        })
        .collect();
    versions.sort();
    Ok(versions.pop())
}

/// Loads a snapshot; an empty snapshot when none exists yet.
pub fn load_snapshot(
    cache_dir: &Path,
    version: Option<&str>,
) -> Result<TaxonomySnapshot, SnapshotError> {
    match snapshot_path(cache_dir, version)? {
        Some(path) => read_snapshot(&path),
        None => Ok(TaxonomySnapshot::default()),
    }
}

fn read_snapshot(path: &Path) -> Result<TaxonomySnapshot, SnapshotError> {
    let content = fs::read_to_string(path)?;
    let mut snapshot: TaxonomySnapshot = serde_json::from_str(&content)?;
    if snapshot.version.is_none() {
        snapshot.version = Some(LEGACY_VERSION.to_string());
    }
    Ok(snapshot)
}

/// Stamps a new version, writes `cache_<version>.json`, and updates `latest.json`.
pub fn save_snapshot(
    snapshot: &mut TaxonomySnapshot,
    cache_dir: &Path,
) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(cache_dir)?;

    let version = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    snapshot.version = Some(version.clone());
    snapshot.created = Some(now_iso());

    let file_name = format!("cache_{}.json", version);
    let path = cache_dir.join(&file_name);
    fs::write(&path, serde_json::to_string_pretty(snapshot)?)?;

    let latest = cache_dir.join(LATEST_FILE);
    if latest.symlink_metadata().is_ok() {
        fs::remove_file(&latest)?;
    }
    if link_latest(&file_name, &latest).is_err() {
        fs::copy(&path, &latest)?;
    }

    Ok(path)
}

#[cfg(unix)]
fn link_latest(file_name: &str, latest: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(file_name, latest)
}

#[cfg(not(unix))]
fn link_latest(_file_name: &str, _latest: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks unavailable",
    ))
}

/// Short fingerprint of the ID sets a snapshot was built from.
pub fn source_hash(tax_ids: &[String], assembly_ids: &[String]) -> String {
    let combined = format!("{}|{}", tax_ids.join(","), assembly_ids.join(","));
    let digest = format!("{:x}", Sha256::digest(combined.as_bytes()));
    digest[..16].to_string()
}

/// Sorted unique tax IDs and assembly IDs across every `top-pages-*.tab` file.
///
/// Assembly IDs include those seen only in workflow URLs.
pub fn scan_ids(data_dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut tax_ids = BTreeSet::new();
    let mut assembly_ids = BTreeSet::new();

    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read data directory {}", data_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let is_export = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("top-pages-") && n.ends_with(".tab"));
        if !is_export {
            continue;
        }

        let file = fs::File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        for line in BufReader::new(file).lines().skip(1) {
            let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
            let url = line.trim().split('\t').next().unwrap_or_default();
            if let Some(caps) = SNAPSHOT_ORGANISM_RE.captures(url) {
                tax_ids.insert(caps[1].to_string());
            }
            if let Some(caps) = SNAPSHOT_ASSEMBLY_RE.captures(url) {
                assembly_ids.insert(caps[1].to_string());
            }
        }
    }

    Ok((tax_ids.into_iter().collect(), assembly_ids.into_iter().collect()))
}

/// Result of a snapshot refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// Every ID was already cached; nothing was written.
    UpToDate {
        /// Snapshot that already covers every ID, `None` when there were no IDs
        path: Option<PathBuf>,
    },
    /// A new snapshot version was written.
    Created {
        /// The new `cache_<version>.json`
        path: PathBuf,
        /// Taxon records in the new snapshot
        taxonomy_entries: usize,
        /// Assembly records in the new snapshot
        assembly_entries: usize,
    },
}

/// Fetches taxonomy for IDs missing from the current snapshot and writes a new version.
pub async fn refresh_snapshot(
    config: &SnapshotConfig,
    stats: Arc<LookupStats>,
) -> Result<RefreshOutcome> {
    let cache_dir = &config.lookup.cache_dir;

    log::info!("Scanning data files in {}", config.data_dir.display());
    let (tax_ids, assembly_ids) = scan_ids(&config.data_dir)?;
    log::info!(
        "Found {} unique tax IDs and {} unique assembly IDs",
        tax_ids.len(),
        assembly_ids.len()
    );

    let base_path = snapshot_path(cache_dir, config.cache_version.as_deref())?;
    let mut snapshot = match &base_path {
        Some(path) => {
            log::info!("Loading snapshot {}", path.display());
            read_snapshot(path)?
        }
        None => {
            log::info!("No existing snapshot found, creating a new one");
            TaxonomySnapshot::default()
        }
    };
    snapshot.source_data_hash = Some(source_hash(&tax_ids, &assembly_ids));

    let (missing_taxa, missing_assemblies): (Vec<String>, Vec<String>) = if config.force_refresh {
        log::info!("Force refresh: re-fetching all IDs into a new snapshot");
        snapshot.taxonomy.clear();
        snapshot.assembly.clear();
        (tax_ids.clone(), assembly_ids.clone())
    } else {
        (
            tax_ids
                .iter()
                .filter(|id| !snapshot.taxonomy.contains_key(*id))
                .cloned()
                .collect(),
            assembly_ids
                .iter()
                .filter(|id| !snapshot.assembly.contains_key(*id))
                .cloned()
                .collect(),
        )
    };
    log::info!(
        "Tax IDs missing from snapshot: {}, assembly IDs missing: {}",
        missing_taxa.len(),
        missing_assemblies.len()
    );

    if !config.force_refresh && missing_taxa.is_empty() && missing_assemblies.is_empty() {
        log::info!("Snapshot is up to date; nothing to fetch");
        return Ok(RefreshOutcome::UpToDate { path: base_path });
    }
    if config.lookup.offline {
        bail!(
            "{} IDs are missing from the snapshot and lookups are offline",
            missing_taxa.len() + missing_assemblies.len()
        );
    }

    let client = NcbiClient::new(&config.lookup).context("Failed to initialize NCBI client")?;

    let total = missing_taxa.len();
    for (i, tax_id) in missing_taxa.iter().enumerate() {
        log_progress("Tax ID", tax_id, i + 1, total);
        let record = match client.taxon_lineage(tax_id).await {
            Ok(found) => TaxonRecord {
                name: found.name.unwrap_or_else(unknown),
                lineage: found.lineage.unwrap_or_else(unknown),
                fetched_at: Some(now_iso()),
                error: None,
            },
            Err(e) => {
                log::warn!("Failed to fetch lineage for taxon {}: {:#}", tax_id, e);
                update_error_stats(&stats, &e);
                TaxonRecord {
                    name: unknown(),
                    lineage: unknown(),
                    fetched_at: Some(now_iso()),
                    error: Some(format!("{:#}", e)),
                }
            }
        };
        snapshot.taxonomy.insert(tax_id.clone(), record);
    }

    let total = missing_assemblies.len();
    for (i, accession) in missing_assemblies.iter().enumerate() {
        log_progress("Assembly", accession, i + 1, total);
        let record = match client.assembly_taxonomy(accession).await {
            Ok(found) => AssemblyRecord {
                tax_id: found.tax_id,
                name: found.organism_name.unwrap_or_else(unknown),
                lineage: unknown(),
                fetched_at: Some(now_iso()),
                error: None,
            },
            Err(e) => {
                log::warn!("Failed to fetch taxonomy for assembly {}: {:#}", accession, e);
                update_error_stats(&stats, &e);
                AssemblyRecord {
                    tax_id: None,
                    name: unknown(),
                    lineage: unknown(),
                    fetched_at: Some(now_iso()),
                    error: Some(format!("{:#}", e)),
                }
            }
        };
        snapshot.assembly.insert(accession.clone(), record);
    }

    snapshot.fill_assembly_lineages();

    let path = save_snapshot(&mut snapshot, cache_dir)?;
    log::info!("Saved snapshot {}", path.display());

    Ok(RefreshOutcome::Created {
        path,
        taxonomy_entries: snapshot.taxonomy.len(),
        assembly_entries: snapshot.assembly.len(),
    })
}

fn log_progress(kind: &str, id: &str, done: usize, total: usize) {
    if done % PROGRESS_LOG_INTERVAL == 0 || done == total {
        log::info!("[{}/{}] {} {}", done, total, kind, id);
    } else {
        log::debug!("[{}/{}] {} {}", done, total, kind, id);
    }
}
