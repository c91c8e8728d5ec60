//! Organism and workflow report commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use crate::analysis::{OrganismAnalysis, WorkflowAnalysis};
use crate::app::print_lookup_statistics;
use crate::config::{AnalyzeConfig, ReportConfig};
use crate::error_handling::{LookupStats, WarningType};
use crate::ingest::{read_export, PageRow};
use crate::report::{date_range_label, OrganismReport, ResolvedNames, WorkflowReport};
use crate::taxonomy::{load_snapshot, NameResolver, TaxonomySnapshot};

use super::{derived_output_path, write_output};

const ORGANISM_TEXT_SUFFIX: &str = "-organism-analysis.txt";
const ORGANISM_HTML_SUFFIX: &str = "-organism-analysis.html";
const WORKFLOW_TEXT_SUFFIX: &str = "-workflow-analysis.txt";
const WORKFLOW_HTML_SUFFIX: &str = "-workflow-analysis.html";

/// Files written by a report command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOutcome {
    /// Text report, `None` when there was nothing to report
    pub text_path: Option<PathBuf>,
    /// HTML report, when one was requested and written
    pub html_path: Option<PathBuf>,
}

/// Files written by `analyze`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeReport {
    /// Organism report outputs
    pub organisms: ReportOutcome,
    /// Workflow report outputs
    pub workflows: ReportOutcome,
}

struct Rendered {
    text: String,
    html: Option<String>,
}

fn load_rows(input: &Path, stats: &LookupStats) -> Result<Vec<PageRow>> {
    let export = read_export(input)?;
    stats.add_warnings(WarningType::MalformedRow, export.skipped);
    info!("Loaded {} rows from {}", export.rows.len(), input.display());
    Ok(export.rows)
}

/// Latest taxonomy snapshot for community colours, if one has been built.
fn html_snapshot(cache_dir: &Path) -> Option<TaxonomySnapshot> {
    match load_snapshot(cache_dir, None) {
        Ok(snapshot) if snapshot.version.is_some() => Some(snapshot),
        Ok(_) => {
            info!("No taxonomy snapshot in {}; communities shown as Other", cache_dir.display());
            None
        }
        Err(e) => {
            warn!("Failed to load taxonomy snapshot: {}", e);
            None
        }
    }
}

async fn render_organisms(
    config: &ReportConfig,
    rows: &[PageRow],
    resolver: &mut NameResolver,
    with_html: bool,
) -> Result<Rendered> {
    let analysis = OrganismAnalysis::from_rows(rows);
    info!(
        "Found {} organism pages, {} assembly pages, {} pathogen pages",
        analysis.organisms.len(),
        analysis.assemblies.len(),
        analysis.pathogens.len()
    );

    let tax_ids = analysis.tax_ids();
    let names = ResolvedNames {
        organisms: resolver.organism_names(&tax_ids).await,
        assemblies: resolver.assembly_names(&analysis.accessions()).await,
    };
    let assemblies_by_taxon = resolver.assemblies_by_taxon(&tax_ids).await;
    let without_assemblies = analysis.organisms_without_assemblies(&assemblies_by_taxon);

    let report = OrganismReport {
        analysis: &analysis,
        without_assemblies: &without_assemblies,
        names: &names,
        biased: &config.biased_assemblies,
        top_limit: config.top_limit,
    };
    let html = if with_html {
        let snapshot = html_snapshot(&config.lookup.cache_dir);
        Some(report.render_html(&date_range_label(&config.input), snapshot.as_ref())?)
    } else {
        None
    };

    Ok(Rendered {
        text: report.to_string(),
        html,
    })
}

/// `None` when the export has no workflow configuration pages.
async fn render_workflows(
    config: &ReportConfig,
    rows: &[PageRow],
    resolver: &mut NameResolver,
    with_html: bool,
) -> Result<Option<Rendered>> {
    let analysis = WorkflowAnalysis::from_rows(rows);
    if analysis.is_empty() {
        return Ok(None);
    }
    info!(
        "Found {} workflow page entries across {} assemblies",
        analysis.visits.len(),
        analysis.by_assembly.len()
    );

    let names = ResolvedNames {
        organisms: Default::default(),
        assemblies: resolver.assembly_names(&analysis.assembly_ids()).await,
    };
    let report = WorkflowReport {
        analysis: &analysis,
        names: &names,
        biased: &config.biased_assemblies,
        top_limit: config.top_limit,
    };
    let html = if with_html {
        let snapshot = html_snapshot(&config.lookup.cache_dir);
        Some(report.render_html(&date_range_label(&config.input), snapshot.as_ref())?)
    } else {
        None
    };

    Ok(Some(Rendered {
        text: report.to_string(),
        html,
    }))
}

fn write_rendered(
    rendered: &Rendered,
    text_path: PathBuf,
    html_path: Option<PathBuf>,
) -> Result<ReportOutcome> {
    write_output(&text_path, &rendered.text)?;
    let html_path = match (html_path, &rendered.html) {
        (Some(path), Some(html)) => {
            write_output(&path, html)?;
            Some(path)
        }
        _ => None,
    };
    Ok(ReportOutcome {
        text_path: Some(text_path),
        html_path,
    })
}

/// Writes the organism report for one export.
///
/// The text report goes to `config.output`, defaulting to
/// `<stem>-organism-analysis.txt` beside the input.
///
/// # Errors
///
/// Fails if the export cannot be read, the lookup client cannot be built, or
/// an output cannot be written. Lookup failures only degrade names to `Unknown`.
pub async fn run_organisms(config: &ReportConfig) -> Result<ReportOutcome> {
    let stats = Arc::new(LookupStats::new());
    let rows = load_rows(&config.input, &stats)?;
    let mut resolver = NameResolver::new(&config.lookup, Arc::clone(&stats))?;

    let rendered =
        render_organisms(config, &rows, &mut resolver, config.html_output.is_some()).await?;
    let text_path = config
        .output
        .clone()
        .unwrap_or_else(|| derived_output_path(&config.input, ORGANISM_TEXT_SUFFIX, None));
    let outcome = write_rendered(&rendered, text_path, config.html_output.clone())?;

    print_lookup_statistics(&stats);
    Ok(outcome)
}

/// Writes the workflow report for one export.
///
/// Nothing is written when the export has no workflow configuration pages.
pub async fn run_workflows(config: &ReportConfig) -> Result<ReportOutcome> {
    let stats = Arc::new(LookupStats::new());
    let rows = load_rows(&config.input, &stats)?;
    let mut resolver = NameResolver::new(&config.lookup, Arc::clone(&stats))?;

    let outcome =
        match render_workflows(config, &rows, &mut resolver, config.html_output.is_some()).await? {
            Some(rendered) => {
                let text_path = config.output.clone().unwrap_or_else(|| {
                    derived_output_path(&config.input, WORKFLOW_TEXT_SUFFIX, None)
                });
                write_rendered(&rendered, text_path, config.html_output.clone())?
            }
            None => {
                warn!("No workflow configuration pages found in {}", config.input.display());
                ReportOutcome::default()
            }
        };

    print_lookup_statistics(&stats);
    Ok(outcome)
}

/// Writes both reports for one export into `config.output_dir`.
///
/// Names resolved for the organism report are reused by the workflow report.
pub async fn run_analyze(config: &AnalyzeConfig) -> Result<AnalyzeReport> {
    let report_config = &config.report;
    let input = &report_config.input;
    let dir = Some(config.output_dir.as_path());

    let stats = Arc::new(LookupStats::new());
    let rows = load_rows(input, &stats)?;
    let mut resolver = NameResolver::new(&report_config.lookup, Arc::clone(&stats))?;

    info!("Analyzing organism pages");
    let rendered = render_organisms(report_config, &rows, &mut resolver, config.html).await?;
    let organisms = write_rendered(
        &rendered,
        derived_output_path(input, ORGANISM_TEXT_SUFFIX, dir),
        config
            .html
            .then(|| derived_output_path(input, ORGANISM_HTML_SUFFIX, dir)),
    )?;

    info!("Analyzing workflow pages");
    let workflows = match render_workflows(report_config, &rows, &mut resolver, config.html).await? {
        Some(rendered) => write_rendered(
            &rendered,
            derived_output_path(input, WORKFLOW_TEXT_SUFFIX, dir),
            config
                .html
                .then(|| derived_output_path(input, WORKFLOW_HTML_SUFFIX, dir)),
        )?,
        None => {
            warn!("No workflow configuration pages found in {}", input.display());
            ReportOutcome::default()
        }
    };

    print_lookup_statistics(&stats);
    Ok(AnalyzeReport {
        organisms,
        workflows,
    })
}
