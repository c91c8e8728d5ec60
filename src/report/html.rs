//! HTML reports rendered with Tera templates.
//!
//! Charts use Chart.js from a CDN; bars and badges are coloured by research
//! community when a taxonomy snapshot is available.

use anyhow::{Context as _, Result};
use serde::Serialize;
use strum::IntoEnumIterator;
use tera::{Context, Tera};

use crate::analysis::PageVisit;
use crate::taxonomy::{accession, community_of, Community, TaxonomySnapshot};

use super::format::{format_time, title_case, truncate};
use super::organisms::{by_visitors, OrganismReport};
use super::workflows::{by_visitors as groups_by_visitors, WorkflowReport};

const CHART_LABEL_KEEP: usize = 25;
const TAXONOMY_BROWSER_URL: &str = "https://www.ncbi.nlm.nih.gov/Taxonomy/Browser/wwwtax.cgi?id=";
const GENOME_URL: &str = "https://www.ncbi.nlm.nih.gov/datasets/genome/";

#[derive(Debug, Serialize)]
struct Bar {
    label: String,
    visitors: u64,
    pageviews: u64,
    color: &'static str,
}

#[derive(Debug, Serialize)]
struct TableRow {
    id: String,
    link: String,
    organism: String,
    community: &'static str,
    color: &'static str,
    visitors: u64,
    pageviews: u64,
    time: String,
}

#[derive(Debug, Serialize)]
struct LegendItem {
    name: &'static str,
    color: &'static str,
}

/// Chart label: first 25 characters, `...` when cut.
fn chart_label(name: &str) -> String {
    if name.chars().count() > CHART_LABEL_KEEP {
        truncate(name, CHART_LABEL_KEEP, CHART_LABEL_KEEP)
    } else {
        name.to_string()
    }
}

fn community_for(lineage: Option<&str>) -> Community {
    lineage.map(community_of).unwrap_or(Community::Other)
}

/// Bars grouped by community in column order, visitors descending within each.
fn community_bars(rows: &[TableRow]) -> Vec<Bar> {
    let mut bars = Vec::new();
    for community in Community::iter() {
        bars.extend(
            rows.iter()
                .filter(|r| r.community == community.as_str())
                .map(|r| Bar {
                    label: chart_label(&r.organism),
                    visitors: r.visitors,
                    pageviews: r.pageviews,
                    color: community.color(),
                }),
        );
    }
    bars
}

fn legend(rows: &[&[TableRow]]) -> Vec<LegendItem> {
    Community::iter()
        .filter(|c| rows.iter().any(|set| set.iter().any(|r| r.community == c.as_str())))
        .map(|c| LegendItem {
            name: c.as_str(),
            color: c.color(),
        })
        .collect()
}

fn render(name: &str, template: &str, context: &Context) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, template)
        .with_context(|| format!("Failed to parse template {}", name))?;
    tera.render(name, context)
        .with_context(|| format!("Failed to render template {}", name))
}

/// Chart data for an inline `<script>`; `<`, `>` and `&` are written as
/// unicode escapes so labels cannot close the element.
fn json<T: Serialize>(value: &T) -> Result<String> {
    let text = serde_json::to_string(value).context("Failed to serialize chart data")?;
    Ok(text
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026"))
}

impl OrganismReport<'_> {
    fn organism_rows(&self, snapshot: Option<&TaxonomySnapshot>) -> Vec<TableRow> {
        by_visitors(&self.analysis.organisms)
            .into_iter()
            .map(|visit| {
                let community =
                    community_for(snapshot.map(|s| s.taxon_lineage(&visit.id)));
                TableRow {
                    id: visit.id.clone(),
                    link: format!("{}{}", TAXONOMY_BROWSER_URL, visit.id),
                    organism: self.names.organism(&visit.id).to_string(),
                    community: community.as_str(),
                    color: community.color(),
                    visitors: visit.row.visitors,
                    pageviews: visit.row.pageviews,
                    time: format_time(visit.row.time_on_page),
                }
            })
            .collect()
    }

    fn assembly_rows(&self, snapshot: Option<&TaxonomySnapshot>) -> Vec<TableRow> {
        by_visitors(&self.analysis.assemblies)
            .into_iter()
            .map(|visit: &PageVisit| {
                let community =
                    community_for(snapshot.map(|s| s.assembly_lineage(&visit.id)));
                TableRow {
                    id: visit.id.clone(),
                    link: format!("{}{}", GENOME_URL, accession::dotted(&visit.id)),
                    organism: self.names.assembly(&visit.id).to_string(),
                    community: community.as_str(),
                    color: community.color(),
                    visitors: visit.row.visitors,
                    pageviews: visit.row.pageviews,
                    time: format_time(visit.row.time_on_page),
                }
            })
            .collect()
    }

    /// Renders the organism report as a standalone HTML page.
    pub fn render_html(
        &self,
        date_range: &str,
        snapshot: Option<&TaxonomySnapshot>,
    ) -> Result<String> {
        let organisms = self.organism_rows(snapshot);
        let assemblies = self.assembly_rows(snapshot);

        let mut landing: Vec<_> = self.analysis.landing.iter().collect();
        landing.sort_by(|a, b| b.row.visitors.cmp(&a.row.visitors));
        let landing_bars: Vec<Bar> = landing
            .iter()
            .map(|visit| Bar {
                label: visit.page.label().to_string(),
                visitors: visit.row.visitors,
                pageviews: visit.row.pageviews,
                color: Community::Bacteria.color(),
            })
            .collect();

        let pathogens: Vec<TableRow> = by_visitors(&self.analysis.pathogens)
            .into_iter()
            .map(|visit| TableRow {
                id: visit.id.clone(),
                link: visit.row.url.clone(),
                organism: title_case(&visit.id),
                community: Community::Other.as_str(),
                color: Community::Other.color(),
                visitors: visit.row.visitors,
                pageviews: visit.row.pageviews,
                time: format_time(visit.row.time_on_page),
            })
            .collect();

        let mut context = Context::new();
        context.insert("date_range", date_range);
        context.insert("legend", &legend(&[organisms.as_slice(), assemblies.as_slice()]));
        context.insert("landing_chart", &json(&landing_bars)?);
        context.insert("organism_chart", &json(&community_bars(&organisms))?);
        context.insert("assembly_chart", &json(&community_bars(&assemblies))?);
        context.insert("pathogens", &pathogens);
        context.insert("organisms", &organisms[..organisms.len().min(self.top_limit)]);
        context.insert("assemblies", &assemblies[..assemblies.len().min(self.top_limit)]);
        context.insert("version", env!("CARGO_PKG_VERSION"));

        render("organisms.html", ORGANISM_TEMPLATE, &context)
    }
}

#[derive(Debug, Serialize)]
struct WorkflowRow {
    name: String,
    visitors: u64,
    pageviews: u64,
    assemblies: usize,
    avg_time: String,
    median_time: String,
}

#[derive(Debug, Serialize)]
struct PairRow {
    workflow: String,
    organism: String,
    assembly: String,
    link: String,
    visitors: u64,
    pageviews: u64,
}

impl WorkflowReport<'_> {
    /// Renders the workflow report as a standalone HTML page.
    pub fn render_html(
        &self,
        date_range: &str,
        snapshot: Option<&TaxonomySnapshot>,
    ) -> Result<String> {
        let analysis = self.analysis;

        let workflow_rows: Vec<WorkflowRow> = groups_by_visitors(&analysis.by_workflow)
            .into_iter()
            .map(|group| WorkflowRow {
                name: group.key.clone(),
                visitors: group.stats.visitors,
                pageviews: group.stats.pageviews,
                assemblies: group.assemblies.len(),
                avg_time: format_time(group.stats.mean_time()),
                median_time: format_time(group.stats.median_time()),
            })
            .collect();

        let assemblies: Vec<TableRow> = groups_by_visitors(&analysis.by_assembly)
            .into_iter()
            .map(|group| {
                let community =
                    community_for(snapshot.map(|s| s.assembly_lineage(&group.key)));
                TableRow {
                    id: group.key.clone(),
                    link: format!("{}{}", GENOME_URL, accession::dotted(&group.key)),
                    organism: self.names.assembly(&group.key).to_string(),
                    community: community.as_str(),
                    color: community.color(),
                    visitors: group.stats.visitors,
                    pageviews: group.stats.pageviews,
                    time: format_time(group.stats.mean_time()),
                }
            })
            .collect();

        let pairs: Vec<PairRow> = groups_by_visitors(&analysis.by_pair)
            .into_iter()
            .take(self.top_limit)
            .map(|group| {
                let (workflow, assembly) = &group.key;
                PairRow {
                    workflow: workflow.clone(),
                    organism: self.names.assembly(assembly).to_string(),
                    assembly: assembly.clone(),
                    link: format!("{}{}", GENOME_URL, accession::dotted(assembly)),
                    visitors: group.stats.visitors,
                    pageviews: group.stats.pageviews,
                }
            })
            .collect();

        let workflow_bars: Vec<Bar> = workflow_rows
            .iter()
            .map(|w| Bar {
                label: chart_label(&w.name),
                visitors: w.visitors,
                pageviews: w.pageviews,
                color: Community::Bacteria.color(),
            })
            .collect();

        let mut context = Context::new();
        context.insert("date_range", date_range);
        context.insert("entries", &analysis.visits.len());
        context.insert("unique_assemblies", &analysis.by_assembly.len());
        context.insert("unique_workflows", &analysis.by_workflow.len());
        context.insert("total_visitors", &analysis.totals.visitors);
        context.insert("total_pageviews", &analysis.totals.pageviews);
        context.insert("avg_time", &format_time(analysis.totals.mean_time()));
        context.insert("median_time", &format_time(analysis.totals.median_time()));
        context.insert("legend", &legend(&[assemblies.as_slice()]));
        context.insert("workflow_chart", &json(&workflow_bars)?);
        context.insert("assembly_chart", &json(&community_bars(&assemblies))?);
        context.insert("workflows", &workflow_rows);
        context.insert("pairs", &pairs);
        context.insert("assemblies", &assemblies);
        context.insert("version", env!("CARGO_PKG_VERSION"));

        render("workflows.html", WORKFLOW_TEMPLATE, &context)
    }
}

const ORGANISM_TEMPLATE: &str = concat!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Organism Analysis - {{ date_range }}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>"#,
    include_str!("html_style.css"),
    r#"</style>
</head>
<body>
    <div class="header">
        <h1>Organism &amp; Pathogen Page Analysis</h1>
        <div class="subtitle">{{ date_range }}</div>
        <div class="legend">{% for item in legend %}<span class="swatch" style="background:{{ item.color }}"></span>{{ item.name }}{% endfor %}</div>
    </div>

    <div class="section">
        <h2 class="section-title">High-Level Navigation Pages</h2>
        <div class="chart-container small"><canvas id="hlChart"></canvas></div>
    </div>

    <div class="section">
        <h2 class="section-title">Priority Pathogen Pages</h2>
        <table>
            <thead><tr><th>Pathogen</th><th class="num">Visitors</th><th class="num">Pageviews</th><th class="num">Avg Time</th></tr></thead>
            <tbody>
            {% for p in pathogens %}<tr><td>{{ p.organism }}</td><td class="num">{{ p.visitors }}</td><td class="num">{{ p.pageviews }}</td><td class="num">{{ p.time }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>

    <div class="section">
        <h2 class="section-title">Top Organism Pages by Community</h2>
        <div class="chart-container medium"><canvas id="orgChart"></canvas></div>
        <table>
            <thead><tr><th>Tax ID</th><th>Organism</th><th>Community</th><th class="num">Visitors</th><th class="num">Pageviews</th></tr></thead>
            <tbody>
            {% for o in organisms %}<tr><td><a href="{{ o.link }}" target="_blank">{{ o.id }}</a></td><td>{{ o.organism }}</td><td><span style="color:{{ o.color }}">{{ o.community }}</span></td><td class="num">{{ o.visitors }}</td><td class="num">{{ o.pageviews }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>

    <div class="section">
        <h2 class="section-title">Top Assembly Pages by Community</h2>
        <div class="chart-container medium"><canvas id="asmChart"></canvas></div>
        <table>
            <thead><tr><th>Assembly ID</th><th>Organism</th><th>Community</th><th class="num">Visitors</th><th class="num">Pageviews</th></tr></thead>
            <tbody>
            {% for a in assemblies %}<tr><td><a href="{{ a.link }}" target="_blank">{{ a.id }}</a></td><td>{{ a.organism }}</td><td><span style="color:{{ a.color }}">{{ a.community }}</span></td><td class="num">{{ a.visitors }}</td><td class="num">{{ a.pageviews }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>

    <div class="footer">Generated by brc_analytics v{{ version }}</div>
    <script>"#,
    include_str!("html_charts.js"),
    r#"
        barChart('hlChart', 'High-Level Navigation Pages', {{ landing_chart | safe }}, true);
        barChart('orgChart', 'Top Organisms by Visitors (colored by community)', {{ organism_chart | safe }}, false);
        barChart('asmChart', 'Top Assemblies by Visitors (colored by community)', {{ assembly_chart | safe }}, false);
    </script>
</body>
</html>
"#
);

const WORKFLOW_TEMPLATE: &str = concat!(
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Workflow Analysis - {{ date_range }}</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>"#,
    include_str!("html_style.css"),
    r#"</style>
</head>
<body>
    <div class="header">
        <h1>Workflow Configuration Page Analysis</h1>
        <div class="subtitle">{{ date_range }} &middot; {{ entries }} workflow configuration page entries</div>
        <div class="legend">{% for item in legend %}<span class="swatch" style="background:{{ item.color }}"></span>{{ item.name }}{% endfor %}</div>
    </div>

    <div class="cards">
        <div class="card"><div class="value">{{ unique_assemblies }}</div><div class="label">Assemblies</div></div>
        <div class="card"><div class="value">{{ unique_workflows }}</div><div class="label">Workflows</div></div>
        <div class="card"><div class="value">{{ total_visitors }}</div><div class="label">Visitors</div></div>
        <div class="card"><div class="value">{{ total_pageviews }}</div><div class="label">Pageviews</div></div>
    </div>
    <div class="subtitle" style="text-align:center;margin-bottom:20px">Average time on page: {{ avg_time }} &middot; Median time on page: {{ median_time }}</div>

    <div class="section">
        <h2 class="section-title">Visitors &amp; Pageviews by Workflow Type</h2>
        <div class="chart-container medium"><canvas id="workflowChart"></canvas></div>
        <table>
            <thead><tr><th>Workflow</th><th class="num">Visitors</th><th class="num">Pageviews</th><th class="num">Assemblies</th><th class="num">Avg Time</th><th class="num">Median Time</th></tr></thead>
            <tbody>
            {% for w in workflows %}<tr><td>{{ w.name }}</td><td class="num">{{ w.visitors }}</td><td class="num">{{ w.pageviews }}</td><td class="num">{{ w.assemblies }}</td><td class="num">{{ w.avg_time }}</td><td class="num">{{ w.median_time }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>

    <div class="section">
        <h2 class="section-title">Workflow-Organism Intersections</h2>
        <table>
            <thead><tr><th>Workflow</th><th>Organism</th><th>Assembly</th><th class="num">Visitors</th><th class="num">Pageviews</th></tr></thead>
            <tbody>
            {% for p in pairs %}<tr><td>{{ p.workflow }}</td><td>{{ p.organism }}</td><td><a href="{{ p.link }}" target="_blank">{{ p.assembly }}</a></td><td class="num">{{ p.visitors }}</td><td class="num">{{ p.pageviews }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>

    <div class="section">
        <h2 class="section-title">Workflow Page Visitors by Assembly (grouped by community)</h2>
        <div class="chart-container medium"><canvas id="assemblyChart"></canvas></div>
        <table>
            <thead><tr><th>Assembly ID</th><th>Organism</th><th>Community</th><th class="num">Visitors</th><th class="num">Pageviews</th><th class="num">Avg Time</th></tr></thead>
            <tbody>
            {% for a in assemblies %}<tr><td><a href="{{ a.link }}" target="_blank">{{ a.id }}</a></td><td>{{ a.organism }}</td><td><span style="color:{{ a.color }}">{{ a.community }}</span></td><td class="num">{{ a.visitors }}</td><td class="num">{{ a.pageviews }}</td><td class="num">{{ a.time }}</td></tr>
            {% endfor %}
            </tbody>
        </table>
    </div>

    <div class="footer">Generated by brc_analytics v{{ version }}</div>
    <script>"#,
    include_str!("html_charts.js"),
    r#"
        barChart('workflowChart', 'Visitors & Pageviews by Workflow Type', {{ workflow_chart | safe }}, true);
        barChart('assemblyChart', 'Workflow Page Visitors by Assembly (colored by community)', {{ assembly_chart | safe }}, false);
    </script>
</body>
</html>
"#
);
