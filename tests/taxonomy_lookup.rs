//! Integration tests for NCBI name resolution against a mock server.
//!
//! These tests verify:
//! - Names come from the Datasets endpoints and are memoized per run
//! - Successful lookups persist in the disk cache across resolvers
//! - Failures resolve to "Unknown", are counted, and are never cached
//! - Transient server errors are retried

mod helpers;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brc_analytics::error_handling::{ErrorType, InfoType};
use brc_analytics::taxonomy::NameResolver;
use brc_analytics::LookupStats;

use helpers::mock_lookup;

fn taxon_body(name: &str) -> serde_json::Value {
    json!({
        "taxonomy_nodes": [
            { "taxonomy": { "tax_id": 5833, "organism_name": name } }
        ]
    })
}

#[tokio::test]
async fn test_organism_name_fetched_once_per_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxonomy/taxon/5833"))
        .respond_with(ResponseTemplate::new(200).set_body_json(taxon_body("Plasmodium falciparum")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let stats = Arc::new(LookupStats::new());
    let mut resolver =
        NameResolver::new(&mock_lookup(&server.uri(), cache.path()), Arc::clone(&stats)).unwrap();

    assert_eq!(resolver.organism_name("5833").await, "Plasmodium falciparum");
    assert_eq!(resolver.organism_name("5833").await, "Plasmodium falciparum");
    assert_eq!(stats.get_info_count(InfoType::ApiRequest), 1);
    assert_eq!(stats.get_info_count(InfoType::MemoHit), 1);
}

#[tokio::test]
async fn test_disk_cache_reused_by_next_resolver() {
    let cache = TempDir::new().unwrap();

    {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genome/accession/GCA_000002765/dataset_report"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reports": [
                    { "accession": "GCA_000002765.3",
                      "organism": { "tax_id": 36329, "organism_name": "Plasmodium falciparum 3D7" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let stats = Arc::new(LookupStats::new());
        let mut resolver =
            NameResolver::new(&mock_lookup(&server.uri(), cache.path()), stats).unwrap();
        assert_eq!(
            resolver.assembly_name("GCA_000002765_3").await,
            "Plasmodium falciparum 3D7"
        );
    }

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let stats = Arc::new(LookupStats::new());
    let mut resolver =
        NameResolver::new(&mock_lookup(&server.uri(), cache.path()), Arc::clone(&stats)).unwrap();
    assert_eq!(
        resolver.assembly_name("GCA_000002765_3").await,
        "Plasmodium falciparum 3D7"
    );
    assert_eq!(stats.get_info_count(InfoType::CacheHit), 1);
}

#[tokio::test]
async fn test_not_found_is_unknown_and_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxonomy/taxon/999999"))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let config = mock_lookup(&server.uri(), cache.path());

    let stats = Arc::new(LookupStats::new());
    let mut resolver = NameResolver::new(&config, Arc::clone(&stats)).unwrap();
    assert_eq!(resolver.organism_name("999999").await, "Unknown");
    assert_eq!(stats.get_error_count(ErrorType::HttpRequestNotFound), 1);

    // a fresh resolver must ask again because failures are never cached
    let mut resolver = NameResolver::new(&config, Arc::new(LookupStats::new())).unwrap();
    assert_eq!(resolver.organism_name("999999").await, "Unknown");
}

#[tokio::test]
async fn test_taxon_assemblies_use_site_spelling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/genome/taxon/5833/dataset_report"))
        .and(query_param("page_size", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reports": [
                { "accession": "GCA_000002765.3" },
                { "accession": "GCF_000002765.6" }
            ]
        })))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let mut resolver = NameResolver::new(
        &mock_lookup(&server.uri(), cache.path()),
        Arc::new(LookupStats::new()),
    )
    .unwrap();

    assert_eq!(
        resolver.taxon_assemblies("5833").await,
        vec!["GCA_000002765_3".to_string(), "GCF_000002765_6".to_string()]
    );
}

#[tokio::test]
async fn test_server_error_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxonomy/taxon/5833"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/taxonomy/taxon/5833"))
        .respond_with(ResponseTemplate::new(200).set_body_json(taxon_body("Plasmodium falciparum")))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let stats = Arc::new(LookupStats::new());
    let mut resolver =
        NameResolver::new(&mock_lookup(&server.uri(), cache.path()), Arc::clone(&stats)).unwrap();

    assert_eq!(resolver.organism_name("5833").await, "Plasmodium falciparum");
    assert_eq!(stats.total_errors(), 0);
}

#[tokio::test]
async fn test_api_key_sent_as_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxonomy/taxon/5833"))
        .and(header("api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(taxon_body("Plasmodium falciparum")))
        .expect(1)
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let mut config = mock_lookup(&server.uri(), cache.path());
    config.api_key = Some("secret".to_string());
    config.use_cache = false;

    let mut resolver = NameResolver::new(&config, Arc::new(LookupStats::new())).unwrap();
    assert_eq!(resolver.organism_name("5833").await, "Plasmodium falciparum");
}

#[tokio::test]
async fn test_empty_taxonomy_response_counts_missing_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/taxonomy/taxon/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "taxonomy_nodes": [] })))
        .mount(&server)
        .await;

    let cache = TempDir::new().unwrap();
    let stats = Arc::new(LookupStats::new());
    let mut resolver =
        NameResolver::new(&mock_lookup(&server.uri(), cache.path()), Arc::clone(&stats)).unwrap();

    assert_eq!(resolver.organism_name("42").await, "Unknown");
    assert_eq!(stats.total_warnings(), 1);
    assert_eq!(stats.total_errors(), 0);
}
