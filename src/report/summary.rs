//! Monthly traffic summary text report.

use std::fmt;

use chrono::NaiveDateTime;
use strum::IntoEnumIterator;

use crate::analysis::{CommunityCounts, MonthSummary, Totals};
use crate::classify::LandingPage;
use crate::config::SUMMARY_WIDTH;
use crate::taxonomy::Community;

use super::format::{rule, section, table_header};

const LEARN_WIDTH: usize = 50;

const NOTES: [&str; 5] = [
    "- 'Organism Pages' = /data/organisms/{tax_id} (individual organism detail pages)",
    "- 'Assembly Pages' = /data/assemblies/{assembly_id} (individual assembly detail pages)",
    "- 'Workflow Pages' = /data/assemblies/{id}/workflow-{...} (workflow configuration pages)",
    "- Index pages (Organisms Index, etc.) are navigation/listing pages, not detail pages",
    "- Community classification based on NCBI taxonomy lineage",
];

/// The summary report over all months. Rendered without a trailing newline.
pub struct SummaryReport<'a> {
    pub months: &'a [MonthSummary],
    pub generated: NaiveDateTime,
}

fn content_cell(totals: Totals) -> String {
    format!(
        "{:>6} / {:>5} / {:<6}",
        totals.count, totals.visitors, totals.pageviews
    )
}

impl SummaryReport<'_> {
    fn community_section(
        &self,
        f: &mut fmt::Formatter<'_>,
        title: &str,
        counts: impl Fn(&MonthSummary) -> &CommunityCounts,
    ) -> fmt::Result {
        section(f, title, SUMMARY_WIDTH)?;
        let mut header = format!("{:<12}", "Month");
        for community in Community::iter() {
            header.push_str(&format!("{:>14}", community.as_str()));
        }
        table_header(f, &header, SUMMARY_WIDTH)?;
        for month in self.months {
            write!(f, "{:<12}", month.label)?;
            for community in Community::iter() {
                let totals = counts(month).get(community);
                write!(f, "{:>5}/{:<7}", totals.count, totals.visitors)?;
            }
            writeln!(f)?;
        }
        write!(f, "\n\n")
    }
}

impl fmt::Display for SummaryReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        rule(f, '=', SUMMARY_WIDTH)?;
        writeln!(f, "BRC ANALYTICS - MONTHLY TRAFFIC SUMMARY")?;
        writeln!(f, "Generated: {}", self.generated.format("%Y-%m-%d %H:%M"))?;
        rule(f, '=', SUMMARY_WIDTH)?;
        writeln!(f)?;

        section(f, "HIGH-LEVEL PAGES (Visitors / Pageviews)", SUMMARY_WIDTH)?;
        let mut header = format!("{:<12}", "Month");
        for page in LandingPage::ALL {
            let label: String = page.label().chars().take(15).collect();
            header.push_str(&format!("{:>18}", label));
        }
        table_header(f, &header, SUMMARY_WIDTH)?;
        for month in self.months {
            write!(f, "{:<12}", month.label)?;
            for page in LandingPage::ALL {
                let totals = month.landing_totals(page);
                write!(f, "{:>8}/{:<8}", totals.visitors, totals.pageviews)?;
            }
            writeln!(f)?;
        }
        write!(f, "\n\n")?;

        section(
            f,
            "CONTENT PAGES - TOTALS (Unique Pages / Visitors / Pageviews)",
            SUMMARY_WIDTH,
        )?;
        table_header(
            f,
            &format!(
                "{:<12}{:>25}{:>25}{:>25}{:>25}",
                "Month", "Organism Pages", "Assembly Pages", "Workflow Pages", "Priority Pathogens"
            ),
            SUMMARY_WIDTH,
        )?;
        for month in self.months {
            writeln!(
                f,
                "{:<12}{}{}{}{}",
                month.label,
                content_cell(month.organisms),
                content_cell(month.assemblies),
                content_cell(month.workflows),
                content_cell(month.pathogens)
            )?;
        }
        write!(f, "\n\n")?;

        self.community_section(
            f,
            "ORGANISM PAGES BY COMMUNITY (Unique Pages / Visitors)",
            |m| &m.organisms_by_community,
        )?;
        self.community_section(
            f,
            "ASSEMBLY PAGES BY COMMUNITY (Unique Pages / Visitors)",
            |m| &m.assemblies_by_community,
        )?;
        self.community_section(
            f,
            "WORKFLOW PAGES BY COMMUNITY (Unique Pages / Visitors)",
            |m| &m.workflows_by_community,
        )?;

        section(f, "LEARN / FEATURED ANALYSES PAGES", LEARN_WIDTH)?;
        table_header(
            f,
            &format!("{:<12}{:>12}{:>12}", "Month", "Visitors", "Pageviews"),
            LEARN_WIDTH,
        )?;
        for month in self.months {
            writeln!(
                f,
                "{:<12}{:>12}{:>12}",
                month.label, month.learn.visitors, month.learn.pageviews
            )?;
        }
        write!(f, "\n\n")?;

        rule(f, '=', SUMMARY_WIDTH)?;
        writeln!(f, "NOTES:")?;
        for note in NOTES {
            writeln!(f, "{}", note)?;
        }
        write!(f, "{}", "=".repeat(SUMMARY_WIDTH))
    }
}
