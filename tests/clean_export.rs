//! Tests for repairing copy-pasted exports.

mod helpers;

use std::fs;

use tempfile::TempDir;

use brc_analytics::ingest::read_export;
use brc_analytics::run_clean;

use helpers::EXPORT_HEADER;

#[test]
fn test_clean_then_read_round_trip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.tab");
    fs::write(
        &input,
        "Page url Visitors Pageviews\n\
/data/organisms/5833\n\
12\t15\t40%\t1m 5s\n\
/data/assemblies/GCA_000002765_3 4\t6\t-\t-\n\
/about 3 5 60% 20s\n\
garbage line\n",
    )
    .unwrap();

    let report = run_clean(&input, None).unwrap();
    assert_eq!(report.output, dir.path().join("raw-cleaned.tab"));
    assert_eq!(report.rows, 3);
    assert_eq!(report.dropped, 1);

    let cleaned = fs::read_to_string(&report.output).unwrap();
    assert!(cleaned.starts_with(EXPORT_HEADER));

    let export = read_export(&report.output).unwrap();
    assert_eq!(export.skipped, 0);
    let urls: Vec<&str> = export.rows.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["/data/organisms/5833", "/data/assemblies/GCA_000002765_3", "/about"]
    );
    assert_eq!(export.rows[0].time_on_page, Some(65));
    assert_eq!(export.rows[2].visitors, 3);
}

#[test]
fn test_clean_explicit_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.tab");
    fs::write(&input, "Page url\tVisitors\tPageviews\n/\t1\t2\n").unwrap();
    let output = dir.path().join("nested/fixed.tab");

    let report = run_clean(&input, Some(&output)).unwrap();
    assert_eq!(report.output, output);
    assert!(output.exists());
}
