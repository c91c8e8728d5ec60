//! Integration tests for the taxonomy snapshot lifecycle.
//!
//! These tests verify:
//! - A refresh fetches lineages and assembly organisms and saves a version
//! - A second refresh with nothing missing makes no requests
//! - The monthly summary classifies communities from the saved snapshot

mod helpers;

use std::fs;

use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brc_analytics::taxonomy::{load_snapshot, RefreshOutcome};
use brc_analytics::{run_snapshot, run_summary, SnapshotConfig, SummaryConfig};

use helpers::{mock_lookup, offline_lookup, write_export};

const EFETCH_XML: &str = r#"<?xml version="1.0" ?>
<TaxaSet><Taxon>
    <TaxId>5833</TaxId>
    <ScientificName>Plasmodium falciparum</ScientificName>
    <Lineage>cellular organisms; Eukaryota; Sar; Alveolata; Apicomplexa; Aconoidasida</Lineage>
</Taxon></TaxaSet>"#;

async fn mount_ncbi(server: &MockServer, expected: u64) {
    Mock::given(method("GET"))
        .and(path("/efetch.fcgi"))
        .and(query_param("db", "taxonomy"))
        .and(query_param("id", "5833"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EFETCH_XML))
        .expect(expected)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/genome/accession/GCA_000002765.3/dataset_report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reports": [
                { "accession": "GCA_000002765.3",
                  "organism": { "tax_id": 5833, "organism_name": "Plasmodium falciparum 3D7" } }
            ]
        })))
        .expect(expected)
        .mount(server)
        .await;
}

fn data_dir(root: &TempDir) -> std::path::PathBuf {
    let data = root.path().join("data");
    fs::create_dir(&data).unwrap();
    write_export(
        &data,
        "top-pages-2025-05-01-to-2025-05-31.tab",
        &[
            "/\t100\t200\t40%\t1m 0s",
            "/data/organisms/5833\t12\t15\t-\t30s",
            "/data/assemblies/GCA_000002765_3\t4\t6\t-\t-",
        ],
    );
    data
}

#[tokio::test]
async fn test_refresh_creates_snapshot() {
    let root = TempDir::new().unwrap();
    let data = data_dir(&root);
    let cache = root.path().join("cache");

    let server = MockServer::start().await;
    mount_ncbi(&server, 1).await;

    let config = SnapshotConfig {
        data_dir: data,
        lookup: mock_lookup(&server.uri(), &cache),
        ..Default::default()
    };
    let outcome = run_snapshot(&config).await.unwrap();
    match outcome {
        RefreshOutcome::Created {
            taxonomy_entries,
            assembly_entries,
            ..
        } => {
            assert_eq!(taxonomy_entries, 1);
            assert_eq!(assembly_entries, 1);
        }
        other => panic!("expected a new snapshot, got {:?}", other),
    }

    let snapshot = load_snapshot(&cache, None).unwrap();
    assert!(snapshot.version.is_some());
    assert!(snapshot.source_data_hash.is_some());
    assert_eq!(snapshot.taxon_name("5833"), "Plasmodium falciparum");
    assert!(snapshot.assembly_lineage("GCA_000002765_3").contains("Apicomplexa"));
    assert_eq!(snapshot.assembly_name("GCA_000002765_3"), "Plasmodium falciparum 3D7");
    assert!(cache.join("latest.json").exists());
}

#[tokio::test]
async fn test_second_refresh_is_up_to_date() {
    let root = TempDir::new().unwrap();
    let data = data_dir(&root);
    let cache = root.path().join("cache");

    let server = MockServer::start().await;
    mount_ncbi(&server, 1).await;

    let config = SnapshotConfig {
        data_dir: data,
        lookup: mock_lookup(&server.uri(), &cache),
        ..Default::default()
    };
    run_snapshot(&config).await.unwrap();

    let outcome = run_snapshot(&config).await.unwrap();
    assert!(matches!(outcome, RefreshOutcome::UpToDate { path: Some(_) }));
}

#[tokio::test]
async fn test_offline_refresh_of_cached_ids_succeeds() {
    let root = TempDir::new().unwrap();
    let data = data_dir(&root);
    let cache = root.path().join("cache");

    let server = MockServer::start().await;
    mount_ncbi(&server, 1).await;
    run_snapshot(&SnapshotConfig {
        data_dir: data.clone(),
        lookup: mock_lookup(&server.uri(), &cache),
        ..Default::default()
    })
    .await
    .unwrap();

    let offline = SnapshotConfig {
        data_dir: data,
        lookup: offline_lookup(&cache),
        ..Default::default()
    };
    assert!(run_snapshot(&offline).await.is_ok());
}

#[tokio::test]
async fn test_summary_uses_snapshot_communities() {
    let root = TempDir::new().unwrap();
    let data = data_dir(&root);
    let cache = root.path().join("cache");

    let server = MockServer::start().await;
    mount_ncbi(&server, 1).await;
    run_snapshot(&SnapshotConfig {
        data_dir: data.clone(),
        lookup: mock_lookup(&server.uri(), &cache),
        ..Default::default()
    })
    .await
    .unwrap();

    let output = root.path().join("summary.txt");
    let outcome = run_summary(&SummaryConfig {
        data_dir: data,
        output: Some(output.clone()),
        cache_dir: cache,
        cache_version: None,
    })
    .await
    .unwrap();
    assert_eq!(outcome.months, vec!["May 2025".to_string()]);
    assert!(outcome.snapshot_version.is_some());

    let text = fs::read_to_string(&output).unwrap();
    // Viruses, Bacteria, Fungi empty; Protists holds the one organism page
    let organisms_row = format!(
        "{:<12}{:>5}/{:<7}{:>5}/{:<7}{:>5}/{:<7}{:>5}/{:<7}",
        "May 2025", 0, 0, 0, 0, 0, 0, 1, 12
    );
    assert!(text.contains(&organisms_row), "{}", text);
}
