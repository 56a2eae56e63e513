//! Standalone HTML report and the [`ReportExporter`] used by the server.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use stories_core::formatting::format_rate;
use stories_core::Result;
use stories_runtime::dashboard::ReportExporter;
use stories_runtime::view::DashboardView;

use crate::charts::ChartSet;
use crate::components::kpi_cards::{kpi_cards, render_kpi_cards};
use crate::excel;
use crate::table_view::{build_rows, render_table, TableTotals};
use crate::themes::Theme;

/// plotly.js build matching the `plotly` crate's generated JSON.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

pub const REPORT_TITLE: &str = "Instagram Stories engagement report";

// ── ReportSection ─────────────────────────────────────────────────────────────

/// A titled section of the report.
pub struct ReportSection {
    title: String,
    content_blocks: Vec<Markup>,
}

impl ReportSection {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            content_blocks: Vec::new(),
        }
    }

    pub fn add_content(&mut self, content: Markup) {
        self.content_blocks.push(content);
    }

    /// Add an inline plotly chart fragment.
    pub fn add_chart(&mut self, inline_html: String) {
        self.content_blocks.push(html! {
            div.chart { (PreEscaped(inline_html)) }
        });
    }

    fn render(&self) -> Markup {
        html! {
            section.panel {
                h2 { (self.title) }
                @for block in &self.content_blocks {
                    (block)
                }
            }
        }
    }
}

// ── Report rendering ──────────────────────────────────────────────────────────

/// Build the report sections for `view`.
pub fn report_sections(view: &DashboardView, theme: &Theme) -> Vec<ReportSection> {
    let mut summary = ReportSection::new("Summary");
    summary.add_content(render_kpi_cards(&kpi_cards(&view.kpis)));

    let totals = TableTotals::from_kpis(&view.kpis);

    let mut by_brand = ReportSection::new("Comparison by brand and period");
    by_brand.add_content(render_table(
        &build_rows(&view.brand_comparisons),
        &totals,
        false,
    ));

    let mut by_type = ReportSection::new("Comparison by brand, content type and period");
    by_type.add_content(render_table(&build_rows(&view.comparisons), &totals, true));

    let mut charts = ReportSection::new("Charts");
    for chart in ChartSet::build(view, theme).to_inline_html("report") {
        charts.add_chart(chart);
    }

    vec![summary, by_brand, by_type, charts]
}

/// One-line description of the filter in force.
pub fn describe_filter(view: &DashboardView) -> String {
    let join = |set: &std::collections::BTreeSet<String>| {
        if set.is_empty() {
            "all".to_string()
        } else {
            set.iter().cloned().collect::<Vec<_>>().join(", ")
        }
    };
    let bound = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string())
            .unwrap_or_else(|| "…".to_string())
    };
    format!(
        "Brands: {}. Content types: {}. Dates: {} to {}. Granularity: {}.",
        join(&view.filter.brands),
        join(&view.filter.content_types),
        bound(view.filter.from),
        bound(view.filter.to),
        view.options.granularity,
    )
}

/// Render the complete standalone report document.
pub fn render_report(view: &DashboardView, theme: &Theme) -> Markup {
    let generated = view.generated_at.format("%Y-%m-%d %H:%M:%S").to_string();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { (REPORT_TITLE) }
                script src=(PLOTLY_CDN) {}
                style { (PreEscaped(theme.css())) }
            }
            body {
                h1 { (REPORT_TITLE) }
                p.muted {
                    "Current year: " (view.sources.current_file)
                    " (" (view.sources.current_rows) " rows). Prior year: "
                    (view.sources.prior_file)
                    " (" (view.sources.prior_rows) " rows)."
                }
                p.muted { (describe_filter(view)) }
                p.muted {
                    "Overall engagement rate: "
                    (format_rate(view.kpis.current.engagement_rate))
                    " vs "
                    (format_rate(view.kpis.prior.engagement_rate))
                }
                @for section in report_sections(view, theme) {
                    (section.render())
                }
                footer.muted { "Generated on " (generated) }
            }
        }
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Renders both download formats with one theme.
#[derive(Debug, Clone, Default)]
pub struct Reports {
    theme: Theme,
}

impl Reports {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }
}

impl ReportExporter for Reports {
    fn render_html(&self, view: &DashboardView) -> Result<String> {
        Ok(render_report(view, &self.theme).into_string())
    }

    fn render_xlsx(&self, view: &DashboardView) -> Result<Vec<u8>> {
        excel::render_workbook(view)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
