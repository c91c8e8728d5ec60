//! NCBI response payloads and lookup results.

use serde::{Deserialize, Serialize};

/// `GET taxonomy/taxon/{id}` response.
#[derive(Debug, Deserialize)]
pub(crate) struct TaxonomyResponse {
    #[serde(default)]
    pub(crate) taxonomy_nodes: Vec<TaxonomyNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaxonomyNode {
    pub(crate) taxonomy: Option<OrganismNames>,
}

/// Name fields shared by taxonomy nodes and dataset report organisms.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrganismNames {
    pub(crate) tax_id: Option<serde_json::Value>,
    pub(crate) common_name: Option<String>,
    pub(crate) organism_name: Option<String>,
    pub(crate) sci_name: Option<String>,
}

impl OrganismNames {
    /// Common name, else organism name, else scientific name; blanks skipped.
    pub(crate) fn preferred_name(&self) -> Option<String> {
        [&self.common_name, &self.organism_name, &self.sci_name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Tax ID as a string, whether NCBI sent a number or a string.
    pub(crate) fn tax_id_string(&self) -> Option<String> {
        match self.tax_id.as_ref()? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

/// `GET genome/.../dataset_report` response.
#[derive(Debug, Deserialize)]
pub(crate) struct DatasetReportResponse {
    #[serde(default)]
    pub(crate) reports: Vec<DatasetReport>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatasetReport {
    pub(crate) accession: Option<String>,
    pub(crate) organism: Option<OrganismNames>,
}

/// Scientific name and lineage of a taxon from E-utilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonLineage {
    /// Scientific name
    pub name: Option<String>,
    /// Semicolon-separated lineage
    pub lineage: Option<String>,
}

/// The organism an assembly belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyTaxonomy {
    /// Organism tax ID
    pub tax_id: Option<String>,
    /// Organism name as the dataset report gives it
    pub organism_name: Option<String>,
}
