//! Page URL classification.
//!
//! Every site path falls into exactly one [`PageKind`]. The rules are
//! anchored regexes over the path, checked in a fixed order.

use std::sync::LazyLock;

use regex::Regex;

use crate::utils::compile_regex_unsafe;

static ORGANISM_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"^/data/organisms/([0-9]+)$", "ORGANISM_RE"));
static PATHOGEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"^/data/priority-pathogens/([^/]+)$", "PATHOGEN_RE")
});
static ASSEMBLY_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(r"^/data/assemblies/([^/]+)$", "ASSEMBLY_RE"));
static WORKFLOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(r"^/data/assemblies/([^/]+)/workflow-(.+)$", "WORKFLOW_RE")
});
static WORKFLOW_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex_unsafe(
        r"/workflow-github-com-iwc-workflows-([^-]+(?:-[^-]+)*?)-(?:main|versions)",
        "WORKFLOW_NAME_RE",
    )
});

/// Path prefix of the learning resources section.
pub const LEARN_PREFIX: &str = "/learn";

/// Name returned when a workflow URL does not follow the IWC naming scheme.
pub const UNKNOWN_WORKFLOW: &str = "unknown";

/// High-level navigation pages, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LandingPage {
    Home,
    OrganismsIndex,
    AssembliesIndex,
    PriorityPathogensIndex,
    Roadmap,
    About,
    Calendar,
}

impl LandingPage {
    /// All landing pages in report order.
    pub const ALL: [LandingPage; 7] = [
        LandingPage::Home,
        LandingPage::OrganismsIndex,
        LandingPage::AssembliesIndex,
        LandingPage::PriorityPathogensIndex,
        LandingPage::Roadmap,
        LandingPage::About,
        LandingPage::Calendar,
    ];

    /// Site path of the page.
    pub fn path(&self) -> &'static str {
        match self {
            LandingPage::Home => "/",
            LandingPage::OrganismsIndex => "/data/organisms",
            LandingPage::AssembliesIndex => "/data/assemblies",
            LandingPage::PriorityPathogensIndex => "/data/priority-pathogens",
            LandingPage::Roadmap => "/roadmap",
            LandingPage::About => "/about",
            LandingPage::Calendar => "/calendar",
        }
    }

    /// Human-readable label used by the monthly summary.
    pub fn label(&self) -> &'static str {
        match self {
            LandingPage::Home => "Home",
            LandingPage::OrganismsIndex => "Organisms Index",
            LandingPage::AssembliesIndex => "Assemblies Index",
            LandingPage::PriorityPathogensIndex => "Priority Pathogens Index",
            LandingPage::Roadmap => "Roadmap",
            LandingPage::About => "About",
            LandingPage::Calendar => "Calendar",
        }
    }

    /// Looks up the landing page with exactly this path.
    pub fn from_path(path: &str) -> Option<LandingPage> {
        Self::ALL.into_iter().find(|p| p.path() == path)
    }
}

/// The category of a site page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// One of the high-level navigation pages
    Landing(LandingPage),
    /// `/data/organisms/{tax_id}`
    Organism { tax_id: String },
    /// `/data/priority-pathogens/{slug}`
    PriorityPathogen { slug: String },
    /// `/data/assemblies/{accession}`
    Assembly { accession: String },
    /// `/data/assemblies/{assembly}/workflow-{workflow}`
    Workflow { assembly: String, workflow: String },
    /// Anything under `/learn`
    Learn,
    /// Every other page
    Other,
}

/// Classifies a site path.
pub fn classify(url: &str) -> PageKind {
    if let Some(page) = LandingPage::from_path(url) {
        return PageKind::Landing(page);
    }
    if let Some(caps) = ORGANISM_RE.captures(url) {
        return PageKind::Organism {
            tax_id: caps[1].to_string(),
        };
    }
    if let Some(caps) = PATHOGEN_RE.captures(url) {
        return PageKind::PriorityPathogen {
            slug: caps[1].to_string(),
        };
    }
    if let Some(caps) = ASSEMBLY_RE.captures(url) {
        return PageKind::Assembly {
            accession: caps[1].to_string(),
        };
    }
    if let Some(caps) = WORKFLOW_RE.captures(url) {
        return PageKind::Workflow {
            assembly: caps[1].to_string(),
            workflow: caps[2].to_string(),
        };
    }
    if url.starts_with(LEARN_PREFIX) {
        return PageKind::Learn;
    }
    PageKind::Other
}

/// Extracts the IWC workflow name from a workflow URL.
///
/// `/data/assemblies/X/workflow-github-com-iwc-workflows-rnaseq-pe-main`
/// yields `rnaseq-pe`; URLs outside that scheme yield `"unknown"`.
pub fn workflow_name(url: &str) -> String {
    WORKFLOW_NAME_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_WORKFLOW.to_string())
}
