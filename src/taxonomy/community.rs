//! Research community classification from taxonomic lineages.

use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Research community an organism belongs to, in report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize)]
#[allow(missing_docs)]
pub enum Community {
    Viruses,
    Bacteria,
    Fungi,
    Protists,
    Vectors,
    Hosts,
    Helminths,
    Other,
}

impl Community {
    /// Lineage substrings that place an organism in this community.
    fn patterns(&self) -> &'static [&'static str] {
        match self {
            Community::Viruses => &["Viruses"],
            Community::Bacteria => &["Bacteria"],
            Community::Fungi => &["Fungi"],
            Community::Protists => &[
                "Apicomplexa",
                "Amoebozoa",
                "Euglenozoa",
                "Heterolobosea",
                "Diplomonadida",
                "Parabasalia",
                "Fornicata",
                "Metamonada",
            ],
            Community::Vectors => &[
                "Culicidae",
                "Ixodidae",
                "Glossinidae",
                "Psychodidae",
                "Simuliidae",
                "Reduviidae",
                "Pulicidae",
                "Muscidae",
            ],
            Community::Hosts => &["Mammalia", "Aves", "Amphibia", "Reptilia", "Actinopterygii"],
            Community::Helminths => &[
                "Nematoda",
                "Platyhelminthes",
                "Cestoda",
                "Trematoda",
                "Secernentea",
                "Chromadorea",
            ],
            Community::Other => &[],
        }
    }

    /// Column heading and legend label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Community::Viruses => "Viruses",
            Community::Bacteria => "Bacteria",
            Community::Fungi => "Fungi",
            Community::Protists => "Protists",
            Community::Vectors => "Vectors",
            Community::Hosts => "Hosts",
            Community::Helminths => "Helminths",
            Community::Other => "Other",
        }
    }

    /// Chart and badge colour for the HTML reports.
    pub fn color(&self) -> &'static str {
        match self {
            Community::Viruses => "#dc2626",
            Community::Bacteria => "#2563eb",
            Community::Fungi => "#65a30d",
            Community::Protists => "#7c3aed",
            Community::Vectors => "#ea580c",
            Community::Hosts => "#0891b2",
            Community::Helminths => "#db2777",
            Community::Other => "#6b7280",
        }
    }
}

impl std::fmt::Display for Community {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a semicolon-separated lineage.
///
/// Matching is a case-insensitive substring test; the first community in
/// column order wins. Empty or `Unknown` lineages are `Other`.
pub fn community_of(lineage: &str) -> Community {
    let lineage = lineage.trim();
    if lineage.is_empty() || lineage == crate::config::UNKNOWN {
        return Community::Other;
    }
    let lower = lineage.to_lowercase();

    Community::iter()
        .find(|c| {
            c.patterns()
                .iter()
                .any(|p| lower.contains(&p.to_lowercase()))
        })
        .unwrap_or(Community::Other)
}
