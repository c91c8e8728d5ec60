//! Organism, pathogen, assembly and landing page breakdown.

use std::collections::{HashMap, HashSet};

use crate::classify::{classify, LandingPage, PageKind};
use crate::ingest::PageRow;

/// A page identified by the ID in its path (tax ID, pathogen slug or accession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageVisit {
    pub id: String,
    pub row: PageRow,
}

/// A visit to one of the high-level navigation pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingVisit {
    pub page: LandingPage,
    pub row: PageRow,
}

impl LandingVisit {
    /// Bounce rate as displayed: the recorded rate, else visitors/pageviews.
    pub fn bounce_display(&self) -> String {
        if let Some(rate) = self.row.bounce_rate {
            return format!("{}%", rate);
        }
        if self.row.pageviews > 0 {
            format!("{}%", self.row.visitors * 100 / self.row.pageviews)
        } else {
            "N/A".to_string()
        }
    }
}

/// Pages of one export bucketed for the organism report.
#[derive(Debug, Clone, Default)]
pub struct OrganismAnalysis {
    /// `/data/organisms/{tax_id}` pages
    pub organisms: Vec<PageVisit>,
    /// `/data/priority-pathogens/{slug}` pages
    pub pathogens: Vec<PageVisit>,
    /// `/data/assemblies/{accession}` pages
    pub assemblies: Vec<PageVisit>,
    /// Assembly pages whose accession has no workflow page in the same export
    pub assemblies_without_workflow: Vec<PageVisit>,
    /// High-level navigation pages
    pub landing: Vec<LandingVisit>,
}

impl OrganismAnalysis {
    /// Buckets `rows` by page kind.
    pub fn from_rows(rows: &[PageRow]) -> Self {
        let mut analysis = OrganismAnalysis::default();
        let mut workflow_assemblies: HashSet<String> = HashSet::new();

        for row in rows {
            match classify(&row.url) {
                PageKind::Organism { tax_id } => analysis.organisms.push(PageVisit {
                    id: tax_id,
                    row: row.clone(),
                }),
                PageKind::PriorityPathogen { slug } => analysis.pathogens.push(PageVisit {
                    id: slug,
                    row: row.clone(),
                }),
                PageKind::Assembly { accession } => analysis.assemblies.push(PageVisit {
                    id: accession,
                    row: row.clone(),
                }),
                PageKind::Landing(page) => analysis.landing.push(LandingVisit {
                    page,
                    row: row.clone(),
                }),
                PageKind::Workflow { assembly, .. } => {
                    workflow_assemblies.insert(assembly);
                }
                PageKind::Learn | PageKind::Other => {}
            }
        }

        analysis.assemblies_without_workflow = analysis
            .assemblies
            .iter()
            .filter(|a| !workflow_assemblies.contains(&a.id))
            .cloned()
            .collect();

        analysis
    }

    /// Distinct tax IDs of organism pages, in file order.
    pub fn tax_ids(&self) -> Vec<String> {
        distinct_ids(&self.organisms)
    }

    /// Distinct accessions of assembly pages, in file order.
    pub fn accessions(&self) -> Vec<String> {
        distinct_ids(&self.assemblies)
    }

    /// Organism pages none of whose taxon's assemblies were visited.
    ///
    /// `assemblies_by_taxon` maps tax IDs to the accessions the taxonomy
    /// service lists for them; a missing entry counts as no assemblies.
    pub fn organisms_without_assemblies(
        &self,
        assemblies_by_taxon: &HashMap<String, Vec<String>>,
    ) -> Vec<PageVisit> {
        let visited: HashSet<&str> = self.assemblies.iter().map(|a| a.id.as_str()).collect();

        self.organisms
            .iter()
            .filter(|org| {
                !assemblies_by_taxon
                    .get(&org.id)
                    .is_some_and(|list| list.iter().any(|acc| visited.contains(acc.as_str())))
            })
            .cloned()
            .collect()
    }
}

fn distinct_ids(visits: &[PageVisit]) -> Vec<String> {
    let mut seen = HashSet::new();
    visits
        .iter()
        .filter(|v| seen.insert(v.id.as_str()))
        .map(|v| v.id.clone())
        .collect()
}
