//! Per-month totals for the monthly summary report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;

use crate::classify::{classify, LandingPage, PageKind};
use crate::ingest::PageRow;
use crate::taxonomy::{community_of, Community, TaxonomySnapshot};
use crate::utils::compile_regex_unsafe;

use super::Totals;

static MONTH_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"^top-pages-(\d{4})-(\d{2})-\d{2}-to-(\d{4})-(\d{2})-\d{2}\.tab$",
        "MONTH_FILE_RE",
    )
});

/// A monthly export found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthFile {
    pub year: i32,
    pub month: u32,
    pub path: PathBuf,
    /// `Mon YYYY`, e.g. `May 2025`
    pub label: String,
}

/// Monthly exports in `data_dir`, sorted by the start date's year and month.
pub fn month_files(data_dir: &Path) -> Result<Vec<MonthFile>> {
    let entries = std::fs::read_dir(data_dir)
        .with_context(|| format!("Failed to read data directory {}", data_dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = MONTH_FILE_RE.captures(name) else {
            continue;
        };
        let (Ok(year), Ok(month)) = (caps[1].parse::<i32>(), caps[2].parse::<u32>()) else {
            continue;
        };
        let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
            log::warn!("Skipping {}: invalid month {}-{}", name, year, month);
            continue;
        };
        files.push(MonthFile {
            year,
            month,
            label: start.format("%b %Y").to_string(),
            path,
        });
    }

    files.sort_by(|a, b| (a.year, a.month, &a.path).cmp(&(b.year, b.month, &b.path)));
    Ok(files)
}

/// Totals per research community.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommunityCounts(BTreeMap<Community, Totals>);

impl CommunityCounts {
    fn add(&mut self, community: Community, row: &PageRow) {
        self.0.entry(community).or_default().add(row);
    }

    /// Totals for one community; zero when it had no pages.
    pub fn get(&self, community: Community) -> Totals {
        self.0.get(&community).copied().unwrap_or_default()
    }
}

/// Everything the summary report shows for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub label: String,
    pub year: i32,
    pub month: u32,
    /// One entry per landing page, in report order
    pub landing: Vec<(LandingPage, Totals)>,
    pub organisms: Totals,
    pub assemblies: Totals,
    pub workflows: Totals,
    pub pathogens: Totals,
    pub organisms_by_community: CommunityCounts,
    pub assemblies_by_community: CommunityCounts,
    pub workflows_by_community: CommunityCounts,
    pub learn: Totals,
}

impl MonthSummary {
    /// Totals for one landing page.
    pub fn landing_totals(&self, page: LandingPage) -> Totals {
        self.landing
            .iter()
            .find(|(p, _)| *p == page)
            .map(|(_, t)| *t)
            .unwrap_or_default()
    }
}

/// Summarizes one month of rows.
///
/// Organism pages are classified by their taxon's lineage, assembly and
/// workflow pages by the lineage of the assembly's organism.
pub fn summarize_month(file: &MonthFile, rows: &[PageRow], snapshot: &TaxonomySnapshot) -> MonthSummary {
    let mut landing: Vec<(LandingPage, Totals)> = LandingPage::ALL
        .into_iter()
        .map(|page| (page, Totals::default()))
        .collect();
    let mut summary = MonthSummary {
        label: file.label.clone(),
        year: file.year,
        month: file.month,
        landing: Vec::new(),
        organisms: Totals::default(),
        assemblies: Totals::default(),
        workflows: Totals::default(),
        pathogens: Totals::default(),
        organisms_by_community: CommunityCounts::default(),
        assemblies_by_community: CommunityCounts::default(),
        workflows_by_community: CommunityCounts::default(),
        learn: Totals::default(),
    };

    for row in rows {
        match classify(&row.url) {
            PageKind::Landing(page) => {
                if let Some((_, totals)) = landing.iter_mut().find(|(p, _)| *p == page) {
                    totals.add(row);
                }
            }
            PageKind::Organism { tax_id } => {
                summary.organisms.add(row);
                let community = community_of(snapshot.taxon_lineage(&tax_id));
                summary.organisms_by_community.add(community, row);
            }
            PageKind::Assembly { accession } => {
                summary.assemblies.add(row);
                let community = community_of(snapshot.assembly_lineage(&accession));
                summary.assemblies_by_community.add(community, row);
            }
            PageKind::Workflow { assembly, .. } => {
                summary.workflows.add(row);
                let community = community_of(snapshot.assembly_lineage(&assembly));
                summary.workflows_by_community.add(community, row);
            }
            PageKind::PriorityPathogen { .. } => summary.pathogens.add(row),
            PageKind::Learn => summary.learn.add(row),
            PageKind::Other => {}
        }
    }

    summary.landing = landing;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::{AssemblyRecord, TaxonRecord};
    use tempfile::TempDir;

    fn row(url: &str, visitors: u64, pageviews: u64) -> PageRow {
        PageRow {
            url: url.to_string(),
            visitors,
            pageviews,
            bounce_rate: None,
            time_on_page: None,
        }
    }

    fn may() -> MonthFile {
        MonthFile {
            year: 2025,
            month: 5,
            path: PathBuf::from("top-pages-2025-05-01-to-2025-05-31.tab"),
            label: "May 2025".to_string(),
        }
    }

    fn snapshot() -> TaxonomySnapshot {
        let mut snapshot = TaxonomySnapshot::default();
        snapshot.taxonomy.insert(
            "11676".to_string(),
            TaxonRecord {
                name: "HIV-1".to_string(),
                lineage: "Viruses; Riboviria".to_string(),
                fetched_at: None,
                error: None,
            },
        );
        snapshot.assembly.insert(
            "GCA_1_1".to_string(),
            AssemblyRecord {
                tax_id: Some("5833".to_string()),
                name: "Plasmodium falciparum".to_string(),
                lineage: "Eukaryota; Apicomplexa".to_string(),
                fetched_at: None,
                error: None,
            },
        );
        snapshot
    }

    #[test]
    fn test_month_files_sorted_and_labelled() {
        let dir = TempDir::new().unwrap();
        for name in [
            "top-pages-2025-06-01-to-2025-06-30.tab",
            "top-pages-2024-12-01-to-2024-12-31.tab",
            "top-pages-2025-05-01-to-2025-05-31.tab",
            "top-pages-2025-13-01-to-2025-13-31.tab",
            "top-pages-latest.tab",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }

        let files = month_files(dir.path()).unwrap();
        let labels: Vec<&str> = files.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2024", "May 2025", "Jun 2025"]);
    }

    #[test]
    fn test_month_files_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert!(month_files(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_summarize_month() {
        let rows = vec![
            row("/", 100, 150),
            row("/", 5, 5),
            row("/calendar", 3, 4),
            row("/data/organisms/11676", 10, 12),
            row("/data/organisms/999", 2, 2),
            row("/data/assemblies/GCA_1_1", 7, 9),
            row("/data/assemblies/GCA_1_1/workflow-github-com-iwc-workflows-x-main", 4, 4),
            row("/data/priority-pathogens/malaria", 6, 8),
            row("/learn/featured-analyses/abc", 1, 2),
            row("/learn", 1, 1),
            row("/privacy", 50, 50),
        ];

        let summary = summarize_month(&may(), &rows, &snapshot());

        assert_eq!(summary.landing.len(), LandingPage::ALL.len());
        let home = summary.landing_totals(LandingPage::Home);
        assert_eq!((home.visitors, home.pageviews), (105, 155));
        assert_eq!(summary.landing_totals(LandingPage::Calendar).visitors, 3);
        assert_eq!(summary.landing_totals(LandingPage::About), Totals::default());

        assert_eq!(summary.organisms.count, 2);
        assert_eq!(summary.organisms_by_community.get(Community::Viruses).visitors, 10);
        assert_eq!(summary.organisms_by_community.get(Community::Other).count, 1);

        assert_eq!(summary.assemblies_by_community.get(Community::Protists).count, 1);
        assert_eq!(summary.workflows.count, 1);
        assert_eq!(summary.workflows_by_community.get(Community::Protists).visitors, 4);

        assert_eq!(summary.pathogens.pageviews, 8);
        assert_eq!((summary.learn.count, summary.learn.visitors), (2, 2));
    }
}
