//! Report rendering.
//!
//! Text reports implement [`std::fmt::Display`]; HTML reports are rendered
//! from the same in-memory data with Tera.

mod format;
mod html;
mod organisms;
mod summary;
mod workflows;

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::UNKNOWN;
use crate::utils::compile_regex_unsafe;

pub use organisms::OrganismReport;
pub use summary::SummaryReport;
pub use workflows::WorkflowReport;

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"(\d{4}-\d{2}-\d{2})-to-(\d{4}-\d{2}-\d{2})", "DATE_RANGE_RE")
});

/// Organism names resolved for the pages of one export.
#[derive(Debug, Clone, Default)]
pub struct ResolvedNames {
    /// Keyed by tax ID
    pub organisms: HashMap<String, String>,
    /// Keyed by assembly accession
    pub assemblies: HashMap<String, String>,
}

impl ResolvedNames {
    pub fn organism(&self, tax_id: &str) -> &str {
        self.organisms.get(tax_id).map(String::as_str).unwrap_or(UNKNOWN)
    }

    pub fn assembly(&self, accession: &str) -> &str {
        self.assemblies
            .get(accession)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }
}

/// `2025-05-01 to 2025-05-31` for `top-pages-2025-05-01-to-2025-05-31.tab`,
/// else the file stem.
pub fn date_range_label(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match DATE_RANGE_RE.captures(&stem) {
        Some(caps) => format!("{} to {}", &caps[1], &caps[2]),
        None => stem,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_label() {
        assert_eq!(
            date_range_label(Path::new("data/top-pages-2025-05-01-to-2025-05-31.tab")),
            "2025-05-01 to 2025-05-31"
        );
        assert_eq!(date_range_label(Path::new("export.tab")), "export");
    }

    #[test]
    fn test_resolved_names_fallback() {
        let mut names = ResolvedNames::default();
        names.organisms.insert("1".to_string(), "Root".to_string());
        assert_eq!(names.organism("1"), "Root");
        assert_eq!(names.organism("2"), UNKNOWN);
        assert_eq!(names.assembly("GCA_1_1"), UNKNOWN);
    }
}
