//! End-to-end tests for the organism and workflow report commands.

mod helpers;

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use brc_analytics::taxonomy::{LookupCache, LookupKind};
use brc_analytics::{run_analyze, run_organisms, run_workflows, AnalyzeConfig, ReportConfig};

use helpers::{mock_lookup, offline_lookup, write_export};

const RNASEQ: &str = "workflow-github-com-iwc-workflows-rnaseq-pe-main";

fn sample_rows() -> Vec<String> {
    vec![
        "/\t500\t900\t52%\t1m 4s".to_string(),
        "/data/organisms\t80\t120\t-\t40s".to_string(),
        "/data/organisms/5833\t40\t55\t-\t2m 10s".to_string(),
        "/data/organisms/7165\t9\t11\t-\t-".to_string(),
        "/data/assemblies/GCA_000002765_3\t25\t30\t-\t50s".to_string(),
        "/data/priority-pathogens/malaria\t14\t20\t-\t1m 0s".to_string(),
        format!("/data/assemblies/GCA_000002765_3/{}\t6\t8\t-\t3m 0s", RNASEQ),
        "not a row".to_string(),
    ]
}

fn write_sample(dir: &TempDir) -> std::path::PathBuf {
    let rows = sample_rows();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    write_export(dir.path(), "top-pages-2025-05-01-to-2025-05-31.tab", &rows)
}

#[tokio::test]
async fn test_organism_report_with_cached_names_offline() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir);
    let cache_dir = dir.path().join("cache");

    let cache = LookupCache::new(&cache_dir);
    cache
        .save(LookupKind::TaxonName, "5833", &"Plasmodium falciparum".to_string())
        .unwrap();
    cache
        .save(
            LookupKind::TaxonAssemblies,
            "5833",
            &vec!["GCA_000002765_3".to_string()],
        )
        .unwrap();

    let config = ReportConfig {
        input,
        lookup: offline_lookup(&cache_dir),
        ..Default::default()
    };
    let outcome = run_organisms(&config).await.unwrap();
    let text = fs::read_to_string(outcome.text_path.unwrap()).unwrap();

    assert!(text.contains("Organism pages (all): 2 unique, 49 visitors, 66 pageviews"));
    // 5833 had its assembly visited, so only 7165 is left
    assert!(text.contains(
        "Organism pages (with no assembly page visits): 1 unique, 9 visitors, 11 pageviews"
    ));
    assert!(text.contains("Plasmodium falciparum"));
    assert!(text.contains("Malaria"));
    assert!(text.contains(&format!(
        "{:<40} {:<10} {:<10} {:<12} {:<12}",
        "/", 500, 900, "52%", "1m 4s"
    )));
}

#[tokio::test]
async fn test_workflow_report_resolves_assembly_names() {
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

    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir);
    let output = dir.path().join("workflows.txt");
    let config = ReportConfig {
        input,
        output: Some(output.clone()),
        lookup: mock_lookup(&server.uri(), &dir.path().join("cache")),
        ..Default::default()
    };

    let outcome = run_workflows(&config).await.unwrap();
    assert_eq!(outcome.text_path, Some(output.clone()));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with(&"=".repeat(80)));
    assert!(text.contains("Found 1 workflow configuration page entries"));
    assert!(text.contains(&format!(
        "{:<30} {:<30} {:<10} {:<10}",
        "rnaseq-pe", "Plasmodium falciparum 3D7", 6, 8
    )));
}

#[tokio::test]
async fn test_analyze_writes_text_and_html() {
    let dir = TempDir::new().unwrap();
    let input = write_sample(&dir);
    let out = dir.path().join("output");

    let config = AnalyzeConfig {
        report: ReportConfig {
            input,
            lookup: offline_lookup(&dir.path().join("cache")),
            ..Default::default()
        },
        output_dir: out.clone(),
        html: true,
    };
    run_analyze(&config).await.unwrap();

    let stem = "top-pages-2025-05-01-to-2025-05-31";
    for suffix in [
        "organism-analysis.txt",
        "organism-analysis.html",
        "workflow-analysis.txt",
        "workflow-analysis.html",
    ] {
        let path = out.join(format!("{}-{}", stem, suffix));
        assert!(path.exists(), "missing {}", path.display());
    }

    let html = fs::read_to_string(out.join(format!("{}-organism-analysis.html", stem))).unwrap();
    assert!(html.contains("<html"));
    assert!(html.contains("2025-05-01 to 2025-05-31"));
}
