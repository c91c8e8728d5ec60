//! Traffic breakdowns computed from parsed exports.
//!
//! - [`OrganismAnalysis`]: organism, pathogen, assembly and landing pages
//! - [`WorkflowAnalysis`]: workflow configuration pages grouped three ways
//! - [`MonthSummary`]: per-month totals and community counts for the summary report

mod organisms;
mod summary;
mod workflows;

pub use organisms::{OrganismAnalysis, PageVisit};
pub use summary::{month_files, summarize_month, CommunityCounts, MonthFile, MonthSummary};
pub use workflows::{KeyedAggregate, WorkflowAnalysis};

use crate::ingest::PageRow;

/// Page count plus visitor and pageview sums.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub count: usize,
    pub visitors: u64,
    pub pageviews: u64,
}

impl Totals {
    /// Adds one page to the totals.
    pub fn add(&mut self, row: &PageRow) {
        self.count += 1;
        self.visitors += row.visitors;
        self.pageviews += row.pageviews;
    }

    /// Totals over any sequence of rows.
    pub fn of_rows<'a>(rows: impl IntoIterator<Item = &'a PageRow>) -> Self {
        let mut totals = Totals::default();
        for row in rows {
            totals.add(row);
        }
        totals
    }

    /// Totals over page visits.
    pub fn of_visits(visits: &[PageVisit]) -> Self {
        Self::of_rows(visits.iter().map(|v| &v.row))
    }
}

/// Mean of `times` in whole seconds (truncated), `None` when empty.
pub fn mean_seconds(times: &[u64]) -> Option<u64> {
    if times.is_empty() {
        return None;
    }
    Some(times.iter().sum::<u64>() / times.len() as u64)
}

/// Median of `times` in whole seconds, `None` when empty.
///
/// For an even count the two middle values are averaged and truncated.
pub fn median_seconds(times: &[u64]) -> Option<u64> {
    if times.is_empty() {
        return None;
    }
    let mut sorted = times.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2)
    }
}
