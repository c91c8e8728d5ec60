//! Workflow configuration page breakdown.

use std::collections::HashMap;

use crate::classify::{classify, workflow_name, PageKind};
use crate::ingest::PageRow;

use super::{mean_seconds, median_seconds};

/// A visit to `/data/assemblies/{assembly}/workflow-...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowVisit {
    pub url: String,
    pub assembly: String,
    /// IWC workflow name, or `"unknown"`
    pub workflow: String,
    pub visitors: u64,
    pub pageviews: u64,
    pub time_on_page: Option<u64>,
}

/// Visitor and pageview sums plus every recorded time on page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub visitors: u64,
    pub pageviews: u64,
    pub times: Vec<u64>,
}

impl Aggregate {
    fn add(&mut self, visit: &WorkflowVisit) {
        self.visitors += visit.visitors;
        self.pageviews += visit.pageviews;
        if let Some(t) = visit.time_on_page {
            self.times.push(t);
        }
    }

    /// Truncated mean time on page in seconds.
    pub fn mean_time(&self) -> Option<u64> {
        mean_seconds(&self.times)
    }

    /// Median time on page in seconds.
    pub fn median_time(&self) -> Option<u64> {
        median_seconds(&self.times)
    }
}

/// An [`Aggregate`] under its grouping key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedAggregate<K> {
    pub key: K,
    pub stats: Aggregate,
    /// Distinct assemblies seen in this group, first-seen order
    pub assemblies: Vec<String>,
}

/// Groups values by key, remembering first-seen order.
struct OrderedGroups<K> {
    groups: Vec<KeyedAggregate<K>>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + std::hash::Hash> OrderedGroups<K> {
    fn new() -> Self {
        Self {
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn add(&mut self, key: K, visit: &WorkflowVisit) {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.groups.push(KeyedAggregate {
                    key: key.clone(),
                    stats: Aggregate::default(),
                    assemblies: Vec::new(),
                });
                self.index.insert(key, self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        let group = &mut self.groups[slot];
        group.stats.add(visit);
        if !group.assemblies.contains(&visit.assembly) {
            group.assemblies.push(visit.assembly.clone());
        }
    }
}

/// Workflow pages of one export grouped by assembly, by workflow and by pair.
#[derive(Debug, Clone, Default)]
pub struct WorkflowAnalysis {
    /// Every workflow visit, file order
    pub visits: Vec<WorkflowVisit>,
    /// Grouped by assembly accession
    pub by_assembly: Vec<KeyedAggregate<String>>,
    /// Grouped by workflow name
    pub by_workflow: Vec<KeyedAggregate<String>>,
    /// Grouped by `(workflow, assembly)`
    pub by_pair: Vec<KeyedAggregate<(String, String)>>,
    /// All workflow visits together
    pub totals: Aggregate,
}

impl WorkflowAnalysis {
    /// Collects and groups the workflow pages in `rows`.
    pub fn from_rows(rows: &[PageRow]) -> Self {
        let visits: Vec<WorkflowVisit> = rows
            .iter()
            .filter_map(|row| match classify(&row.url) {
                PageKind::Workflow { assembly, .. } => Some(WorkflowVisit {
                    workflow: workflow_name(&row.url),
                    url: row.url.clone(),
                    assembly,
                    visitors: row.visitors,
                    pageviews: row.pageviews,
                    time_on_page: row.time_on_page,
                }),
                _ => None,
            })
            .collect();

        let mut by_assembly = OrderedGroups::new();
        let mut by_workflow = OrderedGroups::new();
        let mut by_pair = OrderedGroups::new();
        let mut totals = Aggregate::default();

        for visit in &visits {
            by_assembly.add(visit.assembly.clone(), visit);
            by_workflow.add(visit.workflow.clone(), visit);
            by_pair.add((visit.workflow.clone(), visit.assembly.clone()), visit);
            totals.add(visit);
        }

        WorkflowAnalysis {
            visits,
            by_assembly: by_assembly.groups,
            by_workflow: by_workflow.groups,
            by_pair: by_pair.groups,
            totals,
        }
    }

    /// True when the export had no workflow pages.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Assemblies with workflow visits, first-seen order.
    pub fn assembly_ids(&self) -> Vec<String> {
        self.by_assembly.iter().map(|g| g.key.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str, visitors: u64, time: Option<u64>) -> PageRow {
        PageRow {
            url: url.to_string(),
            visitors,
            pageviews: visitors + 1,
            bounce_rate: None,
            time_on_page: time,
        }
    }

    const RNASEQ_A: &str =
        "/data/assemblies/GCA_1_1/workflow-github-com-iwc-workflows-rnaseq-pe-main";
    const RNASEQ_B: &str =
        "/data/assemblies/GCA_2_1/workflow-github-com-iwc-workflows-rnaseq-pe-main";
    const VARIANT_A: &str =
        "/data/assemblies/GCA_1_1/workflow-github-com-iwc-workflows-variant-calling-versions-v2";

    fn sample() -> Vec<PageRow> {
        vec![
            row("/data/assemblies/GCA_1_1", 50, Some(5)),
            row(RNASEQ_A, 5, Some(60)),
            row(VARIANT_A, 3, None),
            row(RNASEQ_B, 8, Some(10)),
            row("/data/assemblies/GCA_3_1/workflow-custom", 1, Some(20)),
        ]
    }

    #[test]
    fn test_collects_only_workflow_pages() {
        let analysis = WorkflowAnalysis::from_rows(&sample());
        assert_eq!(analysis.visits.len(), 4);
        assert_eq!(analysis.visits[3].workflow, "unknown");
    }

    #[test]
    fn test_group_by_workflow() {
        let analysis = WorkflowAnalysis::from_rows(&sample());
        let names: Vec<&str> = analysis
            .by_workflow
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(names, vec!["rnaseq-pe", "variant-calling", "unknown"]);

        let rnaseq = &analysis.by_workflow[0];
        assert_eq!(rnaseq.stats.visitors, 13);
        assert_eq!(rnaseq.stats.pageviews, 15);
        assert_eq!(rnaseq.assemblies, vec!["GCA_1_1", "GCA_2_1"]);
        assert_eq!(rnaseq.stats.mean_time(), Some(35));
        assert_eq!(rnaseq.stats.median_time(), Some(35));
    }

    #[test]
    fn test_group_by_assembly_and_pair() {
        let analysis = WorkflowAnalysis::from_rows(&sample());
        assert_eq!(
            analysis.assembly_ids(),
            vec!["GCA_1_1", "GCA_2_1", "GCA_3_1"]
        );
        assert_eq!(analysis.by_assembly[0].stats.visitors, 8);
        assert_eq!(analysis.by_assembly[0].stats.times, vec![60]);
        assert_eq!(analysis.by_pair.len(), 4);
        assert_eq!(
            analysis.by_pair[1].key,
            ("variant-calling".to_string(), "GCA_1_1".to_string())
        );
    }

    #[test]
    fn test_totals() {
        let analysis = WorkflowAnalysis::from_rows(&sample());
        assert_eq!(analysis.totals.visitors, 17);
        assert_eq!(analysis.totals.times, vec![60, 10, 20]);
        assert_eq!(analysis.totals.mean_time(), Some(30));
        assert_eq!(analysis.totals.median_time(), Some(20));
    }

    #[test]
    fn test_empty() {
        let analysis = WorkflowAnalysis::from_rows(&[row("/", 1, None)]);
        assert!(analysis.is_empty());
        assert_eq!(analysis.totals.mean_time(), None);
    }
}
