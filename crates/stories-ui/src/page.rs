//! The interactive dashboard page.
//!
//! One server-rendered document: the upload form, the filter form and three
//! tabs ("Consolidated data", "Interactive charts", "Reports & downloads").
//! Tabs switch with CSS only.

use maud::{html, Markup, PreEscaped, DOCTYPE};
use stories_core::models::Granularity;
use stories_core::DashboardError;
use stories_runtime::view::{DashboardView, ViewQuery};

use crate::charts::ChartSet;
use crate::components::banner;
use crate::components::kpi_cards::{kpi_cards, render_kpi_cards};
use crate::html_report::{describe_filter, PLOTLY_CDN};
use crate::table_view::{build_rows, render_table, TableTotals};
use crate::themes::Theme;

pub const PAGE_TITLE: &str = "Instagram Stories engagement dashboard";

/// Everything the page needs for one render.
pub struct PageContext<'a> {
    pub theme: &'a Theme,
    pub max_upload_mb: u64,
    /// Error from the last action, shown inline.
    pub error: Option<&'a DashboardError>,
    /// Filtered view; `None` before the first upload or when the filter
    /// matches nothing.
    pub view: Option<&'a DashboardView>,
    /// View whose brands, types and dates populate the filter form. Usually
    /// the same as `view`; an unfiltered view when the filter matched nothing.
    pub choices: Option<&'a DashboardView>,
    pub query: &'a ViewQuery,
    /// Raw query string forwarded to the export links.
    pub query_string: &'a str,
}

pub fn render_page(ctx: &PageContext<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) }
                script src=(PLOTLY_CDN) {}
                style { (PreEscaped(ctx.theme.css())) }
            }
            body {
                h1 { (PAGE_TITLE) }
                p.muted {
                    "Upload this year's and last year's Instagram Stories exports to compare engagement."
                }
                @if let Some(err) = ctx.error {
                    (banner::render_error(err))
                }
                (upload_form(ctx))
                @if let Some(choices) = ctx.choices {
                    (filter_form(ctx, choices))
                }
                @if let Some(view) = ctx.view {
                    (tabs(ctx, view))
                }
            }
        }
    }
}

fn upload_form(ctx: &PageContext<'_>) -> Markup {
    let loaded = ctx.choices.is_some();
    html! {
        details.panel open[!loaded] {
            summary {
                @if loaded { "Replace uploaded files" } @else { "Upload files" }
            }
            form method="post" action="/upload" enctype="multipart/form-data" {
                p {
                    label { "Current year (CSV) " input type="file" name="current" accept=".csv,text/csv" required; }
                }
                p {
                    label { "Prior year (CSV) " input type="file" name="prior" accept=".csv,text/csv" required; }
                }
                p.muted {
                    "Required columns: brand (or account), content type, date, impressions, reach, interactions. Up to "
                    (ctx.max_upload_mb) " MB per upload."
                }
                button type="submit" { "Load files" }
            }
        }
    }
}

fn filter_form(ctx: &PageContext<'_>, choices: &DashboardView) -> Markup {
    let filter = &ctx.query.filter;
    let granularity = ctx.query.granularity.unwrap_or(choices.options.granularity);
    let (min, max) = choices
        .date_span
        .map(|s| (s.from.to_string(), s.to.to_string()))
        .unwrap_or_default();
    html! {
        form.panel method="get" action="/" {
            div.filters {
                fieldset {
                    legend { "Brands" }
                    @for brand in &choices.available_brands {
                        label {
                            input type="checkbox" name="brand" value=(brand) checked[filter.brands.contains(brand)];
                            " " (brand)
                        }
                        br;
                    }
                }
                fieldset {
                    legend { "Content types" }
                    @for ctype in &choices.available_content_types {
                        label {
                            input type="checkbox" name="content_type" value=(ctype) checked[filter.content_types.contains(ctype)];
                            " " (ctype)
                        }
                        br;
                    }
                }
                fieldset {
                    legend { "Dates" }
                    label {
                        "From "
                        input type="date" name="from" min=(min) max=(max)
                            value=[filter.from.map(|d| d.to_string())];
                    }
                    br;
                    label {
                        "To "
                        input type="date" name="to" min=(min) max=(max)
                            value=[filter.to.map(|d| d.to_string())];
                    }
                }
                fieldset {
                    legend { "Granularity" }
                    select name="granularity" {
                        @for g in [Granularity::Monthly, Granularity::Quarterly, Granularity::Yearly] {
                            option value=(g.as_str()) selected[g == granularity] { (g.as_str()) }
                        }
                    }
                }
            }
            p {
                button type="submit" { "Apply filters" }
                " "
                a href="/" { "Reset" }
            }
            p.muted { "Leave a group unticked to include every value." }
        }
    }
}

fn tabs(ctx: &PageContext<'_>, view: &DashboardView) -> Markup {
    let totals = TableTotals::from_kpis(&view.kpis);
    let suffix = if ctx.query_string.is_empty() {
        String::new()
    } else {
        format!("?{}", ctx.query_string)
    };
    html! {
        div.tabs {
            input type="radio" name="tab" id="tab-data" checked;
            label for="tab-data" { "Consolidated data" }
            input type="radio" name="tab" id="tab-charts";
            label for="tab-charts" { "Interactive charts" }
            input type="radio" name="tab" id="tab-reports";
            label for="tab-reports" { "Reports & downloads" }

            div.tab-panel.panel-data {
                p.muted { (describe_filter(view)) }
                (render_kpi_cards(&kpi_cards(&view.kpis)))
                h2 { "By brand and period" }
                (render_table(&build_rows(&view.brand_comparisons), &totals, false))
                h2 { "By brand, content type and period" }
                (render_table(&build_rows(&view.comparisons), &totals, true))
            }
            div.tab-panel.panel-charts {
                @for chart in ChartSet::build(view, ctx.theme).to_inline_html("page") {
                    div.chart { (PreEscaped(chart)) }
                }
            }
            div.tab-panel.panel-reports {
                p { "Download the current selection. Totals match the tables above." }
                p {
                    a.button href={ "/export/report.html" (suffix) } { "HTML report" }
                    " "
                    a.button href={ "/export/report.xlsx" (suffix) } { "Excel workbook" }
                }
                p.muted {
                    "Sources: " (view.sources.current_file) " and " (view.sources.prior_file) "."
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_view;

    fn render(
        view: Option<&DashboardView>,
        error: Option<&DashboardError>,
        query: &ViewQuery,
        query_string: &str,
    ) -> String {
        let theme = Theme::light();
        render_page(&PageContext {
            theme: &theme,
            max_upload_mb: 20,
            error,
            view,
            choices: view,
            query,
            query_string,
        })
        .into_string()
    }

    #[test]
    fn test_empty_page_shows_upload_form_only() {
        let html = render(None, None, &ViewQuery::default(), "");
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("name=\"current\""));
        assert!(html.contains("name=\"prior\""));
        assert!(!html.contains("Consolidated data"));
        assert!(!html.contains("Apply filters"));
    }

    #[test]
    fn test_page_with_view_has_three_tabs() {
        let view = sample_view();
        let html = render(Some(&view), None, &ViewQuery::default(), "");
        assert!(html.contains("Consolidated data"));
        assert!(html.contains("Interactive charts"));
        assert!(html.contains("Reports &amp; downloads"));
        assert!(html.contains("page-brand-rate"));
        assert!(html.contains("href=\"/export/report.xlsx\""));
    }

    #[test]
    fn test_filter_form_reflects_query() {
        let view = sample_view();
        let mut query = ViewQuery::default();
        query.filter.brands.insert("B".to_string());
        query.granularity = Some(Granularity::Quarterly);
        let html = render(Some(&view), None, &query, "brand=B&granularity=quarterly");

        assert!(html.contains("value=\"B\" checked"));
        assert!(!html.contains("value=\"A\" checked"));
        assert!(html.contains("value=\"quarterly\" selected"));
        assert!(html.contains("/export/report.html?brand=B&amp;granularity=quarterly"));
    }

    #[test]
    fn test_error_banner_inline() {
        let err = DashboardError::MissingColumns {
            file: "current".to_string(),
            columns: vec!["reach".to_string()],
        };
        let html = render(None, Some(&err), &ViewQuery::default(), "");
        assert!(html.contains("banner-error"));
        assert!(html.contains("missing required columns: reach"));
    }
}
