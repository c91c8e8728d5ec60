//! Name resolution for report rows.
//!
//! Lookups go memo → disk cache → NCBI. Failures resolve to [`UNKNOWN`] (or an
//! empty assembly list), are counted in [`LookupStats`], and are never cached.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{LookupConfig, UNKNOWN};
use crate::error_handling::{
    update_error_stats, InfoType, InitializationError, LookupStats, WarningType,
};

use super::cache::{LookupCache, LookupKind};
use super::client::NcbiClient;

/// Resolves organism names and taxon assemblies for the reports.
pub struct NameResolver {
    client: Option<NcbiClient>,
    cache: Option<LookupCache>,
    memo: HashMap<(LookupKind, String), Memoized>,
    stats: Arc<LookupStats>,
}

#[derive(Clone)]
enum Memoized {
    Name(String),
    Assemblies(Vec<String>),
}

impl NameResolver {
    /// Creates a resolver; no HTTP client is built when `offline` is set.
    pub fn new(config: &LookupConfig, stats: Arc<LookupStats>) -> Result<Self, InitializationError> {
        let client = if config.offline {
            None
        } else {
            Some(NcbiClient::new(config)?)
        };
        let cache = config
            .use_cache
            .then(|| LookupCache::new(&config.cache_dir));

        Ok(NameResolver {
            client,
            cache,
            memo: HashMap::new(),
            stats,
        })
    }

    /// Shared statistics counters.
    pub fn stats(&self) -> &Arc<LookupStats> {
        &self.stats
    }

    /// Organism name for a tax ID, `Unknown` when it cannot be resolved.
    pub async fn organism_name(&mut self, tax_id: &str) -> String {
        if let Some(Memoized::Name(name)) = self.memo_get(LookupKind::TaxonName, tax_id) {
            return name;
        }
        let name = match self.cached::<String>(LookupKind::TaxonName, tax_id) {
            Some(name) => name,
            None => match &self.client {
                Some(client) => {
                    self.stats.increment_info(InfoType::ApiRequest);
                    let result = client.taxon_name(tax_id).await;
                    self.resolve_name(LookupKind::TaxonName, tax_id, result)
                }
                None => self.offline_name(),
            },
        };
        self.memo_put(LookupKind::TaxonName, tax_id, Memoized::Name(name.clone()));
        name
    }

    /// Organism name for an assembly accession, `Unknown` when it cannot be resolved.
    pub async fn assembly_name(&mut self, accession: &str) -> String {
        if let Some(Memoized::Name(name)) = self.memo_get(LookupKind::AssemblyName, accession) {
            return name;
        }
        let name = match self.cached::<String>(LookupKind::AssemblyName, accession) {
            Some(name) => name,
            None => match &self.client {
                Some(client) => {
                    self.stats.increment_info(InfoType::ApiRequest);
                    let result = client.assembly_name(accession).await;
                    self.resolve_name(LookupKind::AssemblyName, accession, result)
                }
                None => self.offline_name(),
            },
        };
        self.memo_put(LookupKind::AssemblyName, accession, Memoized::Name(name.clone()));
        name
    }

    /// Accessions NCBI lists for a taxon; empty when the lookup fails.
    pub async fn taxon_assemblies(&mut self, tax_id: &str) -> Vec<String> {
        if let Some(Memoized::Assemblies(list)) = self.memo_get(LookupKind::TaxonAssemblies, tax_id)
        {
            return list;
        }
        let list = match self.cached::<Vec<String>>(LookupKind::TaxonAssemblies, tax_id) {
            Some(list) => list,
            None => match &self.client {
                Some(client) => {
                    self.stats.increment_info(InfoType::ApiRequest);
                    match client.taxon_assemblies(tax_id).await {
                        Ok(list) => {
                            self.store(LookupKind::TaxonAssemblies, tax_id, &list);
                            list
                        }
                        Err(e) => {
                            log::warn!("Failed to list assemblies for taxon {}: {:#}", tax_id, e);
                            update_error_stats(&self.stats, &e);
                            Vec::new()
                        }
                    }
                }
                None => {
                    self.stats.increment_info(InfoType::OfflineSkip);
                    Vec::new()
                }
            },
        };
        self.memo_put(
            LookupKind::TaxonAssemblies,
            tax_id,
            Memoized::Assemblies(list.clone()),
        );
        list
    }

    /// Resolves organism names for many tax IDs, logging progress.
    pub async fn organism_names(&mut self, tax_ids: &[String]) -> HashMap<String, String> {
        let total = tax_ids.len();
        let mut names = HashMap::with_capacity(total);
        for (i, tax_id) in tax_ids.iter().enumerate() {
            log::debug!("[{}/{}] Resolving organism name for taxon {}", i + 1, total, tax_id);
            let name = self.organism_name(tax_id).await;
            names.insert(tax_id.clone(), name);
        }
        names
    }

    /// Resolves organism names for many assemblies, logging progress.
    pub async fn assembly_names(&mut self, accessions: &[String]) -> HashMap<String, String> {
        let total = accessions.len();
        let mut names = HashMap::with_capacity(total);
        for (i, accession) in accessions.iter().enumerate() {
            log::debug!("[{}/{}] Resolving organism name for assembly {}", i + 1, total, accession);
            let name = self.assembly_name(accession).await;
            names.insert(accession.clone(), name);
        }
        names
    }

    /// Lists assemblies for many taxa, logging progress.
    pub async fn assemblies_by_taxon(&mut self, tax_ids: &[String]) -> HashMap<String, Vec<String>> {
        let total = tax_ids.len();
        let mut lists = HashMap::with_capacity(total);
        for (i, tax_id) in tax_ids.iter().enumerate() {
            log::debug!("[{}/{}] Listing assemblies for taxon {}", i + 1, total, tax_id);
            let list = self.taxon_assemblies(tax_id).await;
            lists.insert(tax_id.clone(), list);
        }
        lists
    }

    fn memo_get(&self, kind: LookupKind, id: &str) -> Option<Memoized> {
        let hit = self.memo.get(&(kind, id.to_string())).cloned();
        if hit.is_some() {
            self.stats.increment_info(InfoType::MemoHit);
        }
        hit
    }

    fn memo_put(&mut self, kind: LookupKind, id: &str, value: Memoized) {
        self.memo.insert((kind, id.to_string()), value);
    }

    fn cached<T: DeserializeOwned>(&self, kind: LookupKind, id: &str) -> Option<T> {
        let cache = self.cache.as_ref()?;
        match cache.load::<T>(kind, id) {
            Ok(Some(value)) => {
                self.stats.increment_info(InfoType::CacheHit);
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                log::debug!("Ignoring unreadable cache entry for {}: {:#}", id, e);
                None
            }
        }
    }

    fn store<T: Serialize>(&self, kind: LookupKind, id: &str, value: &T) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.save(kind, id, value) {
                log::warn!("Failed to cache lookup for {}: {:#}", id, e);
                self.stats.increment_warning(WarningType::CacheWriteFailed);
            }
        }
    }

    fn resolve_name(
        &self,
        kind: LookupKind,
        id: &str,
        result: anyhow::Result<Option<String>>,
    ) -> String {
        match result {
            Ok(Some(name)) => {
                self.store(kind, id, &name);
                name
            }
            Ok(None) => {
                log::debug!("NCBI returned no organism name for {}", id);
                self.stats.increment_warning(WarningType::MissingOrganismData);
                UNKNOWN.to_string()
            }
            Err(e) => {
                log::warn!("Failed to resolve organism name for {}: {:#}", id, e);
                update_error_stats(&self.stats, &e);
                UNKNOWN.to_string()
            }
        }
    }

    fn offline_name(&self) -> String {
        self.stats.increment_info(InfoType::OfflineSkip);
        UNKNOWN.to_string()
    }
}
