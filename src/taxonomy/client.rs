//! NCBI Datasets and E-utilities client.
//!
//! Every request waits for the shared rate limiter and goes through
//! [`retry_transient`], so only timeouts, connection failures, 429 and 5xx
//! responses are retried.

use std::sync::{Arc, LazyLock};

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::{LookupConfig, RATE_LIMIT_BURST};
use crate::error_handling::InitializationError;
use crate::initialization::{init_client, init_rate_limiter, RateLimiter};
use crate::utils::{compile_regex_unsafe, retry_transient};

use super::accession;
use super::types::{
    AssemblyTaxonomy, DatasetReportResponse, TaxonLineage, TaxonomyResponse,
};

/// Header carrying the API key on Datasets requests.
const API_KEY_HEADER: &str = "api-key";
/// Query parameter carrying the API key on E-utilities requests.
const API_KEY_PARAM: &str = "api_key";
/// Assemblies requested per taxon listing.
const TAXON_ASSEMBLY_PAGE_SIZE: &str = "1000";

static SCIENTIFIC_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"<ScientificName>([^<]+)</ScientificName>", "SCIENTIFIC_NAME_RE")
});
static LINEAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"<Lineage>([^<]+)</Lineage>", "LINEAGE_RE"));

/// Rate-limited client for the NCBI endpoints used by the reports.
pub struct NcbiClient {
    http: Arc<reqwest::Client>,
    limiter: Option<Arc<RateLimiter>>,
    limiter_shutdown: Option<CancellationToken>,
    datasets_base_url: String,
    eutils_base_url: String,
    api_key: Option<String>,
}

impl NcbiClient {
    /// Builds the HTTP client and starts the rate limiter.
    ///
    /// Must be called inside a tokio runtime when pacing is enabled.
    pub fn new(config: &LookupConfig) -> Result<Self, InitializationError> {
        let http = init_client(config)?;
        let (limiter, limiter_shutdown) =
            match init_rate_limiter(config.requests_per_second(), RATE_LIMIT_BURST) {
                Some((limiter, token)) => (Some(limiter), Some(token)),
                None => (None, None),
            };

        Ok(NcbiClient {
            http,
            limiter,
            limiter_shutdown,
            datasets_base_url: config.datasets_base_url.trim_end_matches('/').to_string(),
            eutils_base_url: config.eutils_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    async fn pace(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
    }

    async fn get_datasets<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.datasets_base_url, path);
        let url = url.as_str();
        retry_transient(url, || async move {
            self.pace().await;
            let mut request = self.http.get(url).query(query);
            if let Some(key) = &self.api_key {
                request = request.header(API_KEY_HEADER, key);
            }
            let response = request
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?
                .error_for_status()?;
            let body = response
                .json::<T>()
                .await
                .with_context(|| format!("Failed to decode response from {}", url))?;
            Ok(body)
        })
        .await
    }

    async fn get_eutils_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/{}", self.eutils_base_url, path);
        let url = url.as_str();
        retry_transient(url, || async move {
            self.pace().await;
            let mut request = self.http.get(url).query(query);
            if let Some(key) = &self.api_key {
                request = request.query(&[(API_KEY_PARAM, key.as_str())]);
            }
            let response = request
                .send()
                .await
                .with_context(|| format!("Request to {} failed", url))?
                .error_for_status()?;
            let text = response
                .text()
                .await
                .with_context(|| format!("Failed to read response from {}", url))?;
            Ok(text)
        })
        .await
    }

    /// Preferred organism name of a taxon, `None` if NCBI lists no name.
    pub async fn taxon_name(&self, tax_id: &str) -> Result<Option<String>> {
        let body: TaxonomyResponse = self
            .get_datasets(&format!("taxonomy/taxon/{}", tax_id), &[])
            .await?;
        Ok(body
            .taxonomy_nodes
            .first()
            .and_then(|node| node.taxonomy.as_ref())
            .and_then(|names| names.preferred_name()))
    }

    /// Preferred organism name of an assembly (looked up without its version).
    pub async fn assembly_name(&self, accession_id: &str) -> Result<Option<String>> {
        let unversioned = accession::strip_version(accession_id);
        let body: DatasetReportResponse = self
            .get_datasets(
                &format!("genome/accession/{}/dataset_report", unversioned),
                &[],
            )
            .await?;
        Ok(body
            .reports
            .first()
            .and_then(|report| report.organism.as_ref())
            .and_then(|organism| organism.preferred_name()))
    }

    /// Accessions NCBI lists for a taxon, in site spelling (`GCA_1_1`).
    pub async fn taxon_assemblies(&self, tax_id: &str) -> Result<Vec<String>> {
        let body: DatasetReportResponse = self
            .get_datasets(
                &format!("genome/taxon/{}/dataset_report", tax_id),
                &[("page_size", TAXON_ASSEMBLY_PAGE_SIZE)],
            )
            .await?;
        Ok(body
            .reports
            .iter()
            .filter_map(|report| report.accession.as_deref())
            .map(accession::underscored)
            .collect())
    }

    /// Scientific name and lineage of a taxon.
    pub async fn taxon_lineage(&self, tax_id: &str) -> Result<TaxonLineage> {
        let xml = self
            .get_eutils_text(
                "efetch.fcgi",
                &[("db", "taxonomy"), ("id", tax_id), ("retmode", "xml")],
            )
            .await?;
        Ok(parse_lineage_xml(&xml))
    }

    /// Organism tax ID and name of an assembly (looked up with its version).
    pub async fn assembly_taxonomy(&self, accession_id: &str) -> Result<AssemblyTaxonomy> {
        let versioned = accession::dotted(accession_id);
        let body: DatasetReportResponse = self
            .get_datasets(
                &format!("genome/accession/{}/dataset_report", versioned),
                &[],
            )
            .await?;
        let organism = body
            .reports
            .first()
            .and_then(|report| report.organism.as_ref())
            .ok_or_else(|| anyhow!("No dataset report for assembly {}", versioned))?;
        Ok(AssemblyTaxonomy {
            tax_id: organism.tax_id_string(),
            organism_name: organism
                .organism_name
                .clone()
                .filter(|name| !name.trim().is_empty()),
        })
    }
}

impl Drop for NcbiClient {
    fn drop(&mut self) {
        if let Some(token) = &self.limiter_shutdown {
            token.cancel();
        }
    }
}

/// Extracts the first `<ScientificName>` and `<Lineage>` from an efetch document.
pub(crate) fn parse_lineage_xml(xml: &str) -> TaxonLineage {
    let first = |re: &Regex| {
        re.captures(xml)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    };
    TaxonLineage {
        name: first(&SCIENTIFIC_NAME_RE),
        lineage: first(&LINEAGE_RE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EFETCH_XML: &str = r#"<?xml version="1.0" ?>
<TaxaSet><Taxon>
    <TaxId>5833</TaxId>
    <ScientificName>Plasmodium falciparum</ScientificName>
    <Lineage>cellular organisms; Eukaryota; Sar; Alveolata; Apicomplexa; Aconoidasida</Lineage>
    <LineageEx><Taxon><ScientificName>cellular organisms</ScientificName></Taxon></LineageEx>
</Taxon></TaxaSet>"#;

    #[test]
    fn test_parse_lineage_xml() {
        let parsed = parse_lineage_xml(EFETCH_XML);
        assert_eq!(parsed.name.as_deref(), Some("Plasmodium falciparum"));
        assert!(parsed.lineage.unwrap().ends_with("Apicomplexa; Aconoidasida"));
    }

    #[test]
    fn test_parse_lineage_xml_empty() {
        assert_eq!(parse_lineage_xml("<TaxaSet/>"), TaxonLineage::default());
    }

    #[tokio::test]
    async fn test_new_without_pacing() {
        let config = LookupConfig {
            request_delay_ms: 0,
            api_key: Some("  ".to_string()),
            ..Default::default()
        };
        let client = NcbiClient::new(&config).unwrap();
        assert!(client.limiter.is_none());
        assert!(client.api_key.is_none());
    }
}
