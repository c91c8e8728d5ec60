//! Organism and pathogen text report.

use std::fmt;

use crate::analysis::{OrganismAnalysis, PageVisit, Totals};
use crate::config::REPORT_WIDTH;

use super::format::{
    banner, bias_marker, format_time, section, table_header, title_case, truncate, BIAS_FOOTNOTE,
};
use super::ResolvedNames;

const ORGANISM_HEADER_WIDTHS: (usize, usize) = (33, 30);

/// Everything the organism report renders.
pub struct OrganismReport<'a> {
    pub analysis: &'a OrganismAnalysis,
    /// Organism pages none of whose listed assemblies were visited
    pub without_assemblies: &'a [PageVisit],
    pub names: &'a ResolvedNames,
    pub biased: &'a [String],
    /// Rows shown in the assembly tables
    pub top_limit: usize,
}

/// Visits sorted by visitors, highest first; ties keep input order.
pub(crate) fn by_visitors(visits: &[PageVisit]) -> Vec<&PageVisit> {
    let mut sorted: Vec<&PageVisit> = visits.iter().collect();
    sorted.sort_by(|a, b| b.row.visitors.cmp(&a.row.visitors));
    sorted
}

fn totals_line(f: &mut fmt::Formatter<'_>, label: &str, totals: Totals) -> fmt::Result {
    writeln!(
        f,
        "{}: {} unique, {} visitors, {} pageviews",
        label, totals.count, totals.visitors, totals.pageviews
    )
}

impl OrganismReport<'_> {
    fn organism_table(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        visits: &[PageVisit],
    ) -> fmt::Result {
        section(f, title, REPORT_WIDTH)?;
        table_header(
            f,
            &format!(
                "{:<15} {:<35} {:<10} {:<10} {:<12}",
                "Tax ID", "Organism", "Visitors", "Pageviews", "Avg Time"
            ),
            REPORT_WIDTH,
        )?;
        let (max, keep) = ORGANISM_HEADER_WIDTHS;
        for visit in by_visitors(visits) {
            let organism = truncate(self.names.organism(&visit.id), max, keep);
            writeln!(
                f,
                "{:<15} {:<35} {:<10} {:<10} {:<12}",
                visit.id,
                organism,
                visit.row.visitors,
                visit.row.pageviews,
                format_time(visit.row.time_on_page)
            )?;
        }
        Ok(())
    }

    fn assembly_table(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        visits: &[PageVisit],
    ) -> fmt::Result {
        section(f, title, REPORT_WIDTH)?;
        table_header(
            f,
            &format!(
                "{:<25} {:<35} {:<10} {:<10} {:<12}",
                "Assembly ID", "Organism", "Visitors", "Pageviews", "Avg Time"
            ),
            REPORT_WIDTH,
        )?;
        let (max, keep) = ORGANISM_HEADER_WIDTHS;
        for visit in by_visitors(visits).into_iter().take(self.top_limit) {
            let organism = truncate(self.names.assembly(&visit.id), max, keep);
            writeln!(
                f,
                "{:<25} {:<35} {:<10} {:<10} {:<12}{}",
                visit.id,
                organism,
                visit.row.visitors,
                visit.row.pageviews,
                format_time(visit.row.time_on_page),
                bias_marker(&visit.id, self.biased)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for OrganismReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.analysis;

        banner(f, "ORGANISM AND PATHOGEN PAGE ANALYSIS", REPORT_WIDTH)?;
        writeln!(f)?;

        section(f, "OVERALL STATISTICS", REPORT_WIDTH)?;
        totals_line(f, "Organism pages (all)", Totals::of_visits(&analysis.organisms))?;
        totals_line(
            f,
            "Organism pages (with no assembly page visits)",
            Totals::of_visits(self.without_assemblies),
        )?;
        totals_line(f, "Priority pathogen pages", Totals::of_visits(&analysis.pathogens))?;
        totals_line(f, "Assembly pages (all)", Totals::of_visits(&analysis.assemblies))?;
        totals_line(
            f,
            "Assembly pages (with no workflow page visits)",
            Totals::of_visits(&analysis.assemblies_without_workflow),
        )?;
        write!(f, "\n\n")?;

        section(f, "HIGH-LEVEL NAVIGATION PAGES", REPORT_WIDTH)?;
        table_header(
            f,
            &format!(
                "{:<40} {:<10} {:<10} {:<12} {:<12}",
                "Page", "Visitors", "Pageviews", "Bounce Rate", "Avg Time"
            ),
            REPORT_WIDTH,
        )?;
        let mut landing: Vec<_> = analysis.landing.iter().collect();
        landing.sort_by(|a, b| b.row.visitors.cmp(&a.row.visitors));
        for visit in landing {
            writeln!(
                f,
                "{:<40} {:<10} {:<10} {:<12} {:<12}",
                visit.row.url,
                visit.row.visitors,
                visit.row.pageviews,
                visit.bounce_display(),
                format_time(visit.row.time_on_page)
            )?;
        }
        write!(f, "\n\n")?;

        section(f, "PRIORITY PATHOGEN PAGES", REPORT_WIDTH)?;
        table_header(
            f,
            &format!(
                "{:<40} {:<10} {:<10} {:<12} {:<12}",
                "Pathogen", "Visitors", "Pageviews", "Avg Time", "Median Time"
            ),
            REPORT_WIDTH,
        )?;
        for visit in by_visitors(&analysis.pathogens) {
            // one row per slug, so the mean and median are the same value
            let time = format_time(visit.row.time_on_page);
            writeln!(
                f,
                "{:<40} {:<10} {:<10} {:<12} {:<12}",
                title_case(&visit.id),
                visit.row.visitors,
                visit.row.pageviews,
                time,
                time
            )?;
        }
        write!(f, "\n\n")?;

        self.organism_table(
            f,
            "ORGANISM PAGES (All - Regardless of Assembly Status)",
            &analysis.organisms,
        )?;
        write!(f, "\n\n")?;
        self.organism_table(
            f,
            "ORGANISM PAGES (Where Available Assembly Pages Were Not Visited)",
            self.without_assemblies,
        )?;
        write!(f, "\n\n")?;

        self.assembly_table(
            f,
            "ASSEMBLY PAGES (All - Regardless of Workflow Status)",
            &analysis.assemblies,
        )?;
        write!(f, "\n\n")?;
        self.assembly_table(
            f,
            "ASSEMBLY PAGES (Where Available Workflow Pages Were Not Visited)",
            &analysis.assemblies_without_workflow,
        )?;
        writeln!(f)?;
        writeln!(f, "{}", BIAS_FOOTNOTE)?;
        writeln!(f)
    }
}
