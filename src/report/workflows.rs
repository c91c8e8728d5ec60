//! Workflow configuration page text report.

use std::fmt;

use crate::analysis::{KeyedAggregate, WorkflowAnalysis};
use crate::config::REPORT_WIDTH;

use super::format::{
    banner, bias_marker, format_time, section, table_header, truncate, BIAS_FOOTNOTE,
};
use super::ResolvedNames;

/// Everything the workflow report renders.
pub struct WorkflowReport<'a> {
    pub analysis: &'a WorkflowAnalysis,
    /// Organism names keyed by assembly accession
    pub names: &'a ResolvedNames,
    pub biased: &'a [String],
    /// Rows shown in the intersections table
    pub top_limit: usize,
}

/// Groups sorted by visitors, highest first; ties keep first-seen order.
pub(crate) fn by_visitors<K>(groups: &[KeyedAggregate<K>]) -> Vec<&KeyedAggregate<K>> {
    let mut sorted: Vec<&KeyedAggregate<K>> = groups.iter().collect();
    sorted.sort_by(|a, b| b.stats.visitors.cmp(&a.stats.visitors));
    sorted
}

impl fmt::Display for WorkflowReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.analysis;
        let totals = &analysis.totals;

        banner(f, "WORKFLOW CONFIGURATION PAGE ANALYSIS", REPORT_WIDTH)?;
        writeln!(f)?;
        write!(
            f,
            "Found {} workflow configuration page entries\n\n",
            analysis.visits.len()
        )?;

        section(f, "OVERALL STATISTICS", REPORT_WIDTH)?;
        writeln!(
            f,
            "Total unique assemblies with workflow visits: {}",
            analysis.by_assembly.len()
        )?;
        writeln!(f, "Total unique workflows: {}", analysis.by_workflow.len())?;
        writeln!(f, "Total visitors to workflow pages: {}", totals.visitors)?;
        writeln!(f, "Total pageviews: {}", totals.pageviews)?;
        writeln!(f, "Average time on page: {}", format_time(totals.mean_time()))?;
        writeln!(f, "Median time on page: {}", format_time(totals.median_time()))?;
        write!(f, "\n\n")?;

        section(f, "PER-WORKFLOW BREAKDOWN", REPORT_WIDTH)?;
        table_header(
            f,
            &format!(
                "{:<35} {:<10} {:<10} {:<12} {:<12} {:<12}",
                "Workflow", "Visitors", "Pageviews", "Assemblies", "Avg Time", "Median Time"
            ),
            REPORT_WIDTH,
        )?;
        for group in by_visitors(&analysis.by_workflow) {
            writeln!(
                f,
                "{:<35} {:<10} {:<10} {:<12} {:<12} {:<12}",
                truncate(&group.key, 33, 30),
                group.stats.visitors,
                group.stats.pageviews,
                group.assemblies.len(),
                format_time(group.stats.mean_time()),
                format_time(group.stats.median_time())
            )?;
        }
        write!(f, "\n\n")?;

        section(
            f,
            &format!("WORKFLOW-ORGANISM INTERSECTIONS (Top {})", self.top_limit),
            REPORT_WIDTH,
        )?;
        table_header(
            f,
            &format!(
                "{:<30} {:<30} {:<10} {:<10}",
                "Workflow", "Organism", "Visitors", "Pageviews"
            ),
            REPORT_WIDTH,
        )?;
        for group in by_visitors(&analysis.by_pair).into_iter().take(self.top_limit) {
            let (workflow, assembly) = &group.key;
            writeln!(
                f,
                "{:<30} {:<30} {:<10} {:<10}",
                truncate(workflow, 28, 25),
                truncate(self.names.assembly(assembly), 28, 25),
                group.stats.visitors,
                group.stats.pageviews
            )?;
        }
        write!(f, "\n\n")?;

        section(f, "PER-ASSEMBLY BREAKDOWN", REPORT_WIDTH)?;
        table_header(
            f,
            &format!(
                "{:<20} {:<30} {:<10} {:<10} {:<12} {:<12}",
                "Assembly ID", "Organism", "Visitors", "Pageviews", "Avg Time", "Median Time"
            ),
            REPORT_WIDTH,
        )?;
        for group in by_visitors(&analysis.by_assembly) {
            writeln!(
                f,
                "{:<20} {:<30} {:<10} {:<10} {:<12} {:<12}{}",
                group.key,
                truncate(self.names.assembly(&group.key), 28, 25),
                group.stats.visitors,
                group.stats.pageviews,
                format_time(group.stats.mean_time()),
                format_time(group.stats.median_time()),
                bias_marker(&group.key, self.biased)
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{}", BIAS_FOOTNOTE)?;
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::PageRow;

    const RNASEQ: &str = "workflow-github-com-iwc-workflows-rnaseq-pe-main";
    const VARIANT: &str = "workflow-github-com-iwc-workflows-haploid-variant-calling-wgs-pe-versions-v0-1";

    fn row(url: &str, visitors: u64, time: Option<u64>) -> PageRow {
        PageRow {
            url: url.to_string(),
            visitors,
            pageviews: visitors + 1,
            bounce_rate: None,
            time_on_page: time,
        }
    }

    fn render(rows: &[PageRow], names: &ResolvedNames) -> String {
        let analysis = WorkflowAnalysis::from_rows(rows);
        let biased = vec!["GCA_001008285_1".to_string()];
        WorkflowReport {
            analysis: &analysis,
            names,
            biased: &biased,
            top_limit: 20,
        }
        .to_string()
    }

    #[test]
    fn test_overall_statistics() {
        let rows = vec![
            row(&format!("/data/assemblies/GCA_1_1/{}", RNASEQ), 10, Some(30)),
            row(&format!("/data/assemblies/GCA_2_1/{}", RNASEQ), 5, Some(90)),
            row(&format!("/data/assemblies/GCA_1_1/{}", VARIANT), 1, None),
        ];
        let text = render(&rows, &ResolvedNames::default());

        assert!(text.contains("Found 3 workflow configuration page entries\n\n"));
        assert!(text.contains("Total unique assemblies with workflow visits: 2\n"));
        assert!(text.contains("Total unique workflows: 2\n"));
        assert!(text.contains("Total visitors to workflow pages: 16\n"));
        assert!(text.contains("Total pageviews: 19\n"));
        assert!(text.contains("Average time on page: 1m 0s\n"));
        assert!(text.contains("Median time on page: 1m 0s\n"));
    }

    #[test]
    fn test_no_times_is_na() {
        let rows = vec![row(&format!("/data/assemblies/GCA_1_1/{}", RNASEQ), 1, None)];
        let text = render(&rows, &ResolvedNames::default());
        assert!(text.contains("Average time on page: N/A\n"));
        assert!(text.contains("Median time on page: N/A\n"));
    }

    #[test]
    fn test_per_workflow_row() {
        let rows = vec![
            row(&format!("/data/assemblies/GCA_1_1/{}", RNASEQ), 10, Some(30)),
            row(&format!("/data/assemblies/GCA_2_1/{}", RNASEQ), 5, Some(90)),
        ];
        let text = render(&rows, &ResolvedNames::default());
        let expected = format!(
            "{:<35} {:<10} {:<10} {:<12} {:<12} {:<12}\n",
            "rnaseq-pe", 15, 17, 2, "1m 0s", "1m 0s"
        );
        assert!(text.contains(&expected));
    }

    #[test]
    fn test_intersection_uses_assembly_organism() {
        let mut names = ResolvedNames::default();
        names
            .assemblies
            .insert("GCA_001008285_1".to_string(), "Plasmodium falciparum 3D7".to_string());
        let rows = vec![row(
            &format!("/data/assemblies/GCA_001008285_1/{}", RNASEQ),
            4,
            None,
        )];
        let text = render(&rows, &names);

        let pair = format!(
            "{:<30} {:<30} {:<10} {:<10}\n",
            "rnaseq-pe", "Plasmodium falciparum 3D7", 4, 5
        );
        assert!(text.contains(&pair));
        let assembly = format!(
            "{:<20} {:<30} {:<10} {:<10} {:<12} {:<12} *\n",
            "GCA_001008285_1", "Plasmodium falciparum 3D7", 4, 5, "N/A", "N/A"
        );
        assert!(text.contains(&assembly));
    }

    #[test]
    fn test_sorted_by_visitors() {
        let rows = vec![
            row(&format!("/data/assemblies/GCA_1_1/{}", RNASEQ), 1, None),
            row(&format!("/data/assemblies/GCA_2_1/{}", RNASEQ), 9, None),
        ];
        let text = render(&rows, &ResolvedNames::default());
        let section = &text[text.find("PER-ASSEMBLY BREAKDOWN").unwrap()..];
        assert!(section.find("GCA_2_1").unwrap() < section.find("GCA_1_1").unwrap());
    }
}
