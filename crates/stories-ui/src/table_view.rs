//! Comparison tables for the dashboard page and the reports.
//!
//! Each table has one row per comparison plus a highlighted totals row taken
//! from the view's KPIs, so every rendering shows the same totals. The totals
//! row counts the rows of the table it closes.

use maud::{html, Markup};
use stories_core::formatting::{
    self, format_count, format_optional, format_rate, format_rate_delta, format_variation,
    Variation,
};
use stories_core::models::{ComparisonResult, MetricTotals, Period};
use stories_data::kpi::SummaryKpis;

/// Column headings shared by the HTML tables and the XLSX sheets.
pub const COLUMNS: &[&str] = &[
    "Brand",
    "Content type",
    "Period",
    "Prior period",
    "Posts (current)",
    "Posts (prior)",
    "Impressions (current)",
    "Impressions (prior)",
    "Reach (current)",
    "Reach (prior)",
    "Interactions (current)",
    "Interactions (prior)",
    "Replies per post (current)",
    "Replies per post (prior)",
    "Shares per post (current)",
    "Shares per post (prior)",
    "Engagement rate (current)",
    "Engagement rate (prior)",
    "Rate delta",
    "Rate change",
];

/// Data for a single row of a comparison table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRowData {
    pub brand: String,
    pub content_type: String,
    pub period: String,
    pub prior_period: String,
    /// `None` when the side is absent.
    pub current: Option<MetricTotals>,
    pub prior: Option<MetricTotals>,
    pub current_rate: Option<f64>,
    pub prior_rate: Option<f64>,
    pub rate_delta: Option<f64>,
    pub rate_change_pct: Option<f64>,
}

impl TableRowData {
    pub fn from_comparison(cmp: &ComparisonResult) -> Self {
        Self {
            brand: cmp.brand.clone(),
            content_type: cmp.content_type.clone(),
            period: cmp.bucket.to_string(),
            prior_period: cmp.prior_bucket.to_string(),
            current: cmp.current.as_ref().map(|s| s.totals),
            prior: cmp.prior.as_ref().map(|s| s.totals),
            current_rate: cmp.current_rate(),
            prior_rate: cmp.prior_rate(),
            rate_delta: cmp.rate_delta,
            rate_change_pct: cmp.rate_change_pct,
        }
    }

    pub fn variation(&self) -> Variation {
        format_variation(self.rate_change_pct)
    }

    /// Formatted numeric cells, in [`COLUMNS`] order from "Posts (current)".
    pub fn numeric_cells(&self) -> Vec<String> {
        let count = |side: Option<MetricTotals>, f: fn(&MetricTotals) -> u64| {
            side.map(|t| format_count(f(&t)))
                .unwrap_or_else(|| formatting::MISSING.to_string())
        };
        let mean = |side: Option<MetricTotals>, f: fn(&MetricTotals) -> Option<f64>| {
            format_optional(side.as_ref().and_then(f), 1)
        };
        vec![
            count(self.current, |t| t.posts),
            count(self.prior, |t| t.posts),
            count(self.current, |t| t.impressions),
            count(self.prior, |t| t.impressions),
            count(self.current, |t| t.reach),
            count(self.prior, |t| t.reach),
            count(self.current, |t| t.interactions),
            count(self.prior, |t| t.interactions),
            mean(self.current, MetricTotals::replies_per_post),
            mean(self.prior, MetricTotals::replies_per_post),
            mean(self.current, MetricTotals::shares_per_post),
            mean(self.prior, MetricTotals::shares_per_post),
            format_rate(self.current_rate),
            format_rate(self.prior_rate),
            format_rate_delta(self.rate_delta),
        ]
    }
}

/// Totals row built from the view KPIs.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTotals {
    pub current: MetricTotals,
    pub prior: MetricTotals,
    pub current_rate: Option<f64>,
    pub prior_rate: Option<f64>,
    pub rate_delta: Option<f64>,
    pub rate_change_pct: Option<f64>,
}

impl TableTotals {
    pub fn from_kpis(kpis: &SummaryKpis) -> Self {
        let rate_delta = match (kpis.current.engagement_rate, kpis.prior.engagement_rate) {
            (Some(c), Some(p)) => Some(c - p),
            _ => None,
        };
        Self {
            current: kpis.current.totals,
            prior: kpis.prior.totals,
            current_rate: kpis.current.engagement_rate,
            prior_rate: kpis.prior.engagement_rate,
            rate_delta,
            rate_change_pct: kpis.engagement_rate_change_pct,
        }
    }

    /// Formatted numeric cells, aligned with [`TableRowData::numeric_cells`].
    pub fn numeric_cells(&self) -> Vec<String> {
        TableRowData {
            brand: String::new(),
            content_type: String::new(),
            period: String::new(),
            prior_period: String::new(),
            current: Some(self.current),
            prior: Some(self.prior),
            current_rate: self.current_rate,
            prior_rate: self.prior_rate,
            rate_delta: self.rate_delta,
            rate_change_pct: self.rate_change_pct,
        }
        .numeric_cells()
    }
}

pub fn build_rows(comparisons: &[ComparisonResult]) -> Vec<TableRowData> {
    comparisons.iter().map(TableRowData::from_comparison).collect()
}

/// Sum one side of a set of rows; used to check table totals.
pub fn sum_side(rows: &[TableRowData], period: Period) -> MetricTotals {
    let mut totals = MetricTotals::default();
    for row in rows {
        let side = match period {
            Period::Current => row.current,
            Period::Prior => row.prior,
        };
        if let Some(side) = side {
            totals.merge(&side);
        }
    }
    totals
}

/// Caption of a totals row closing `rows` table rows.
pub fn rows_label(rows: usize) -> String {
    if rows == 1 {
        "1 row".to_string()
    } else {
        format!("{rows} rows")
    }
}

/// Render a comparison table with a totals row.
///
/// `show_type` hides the content-type column for brand-level tables.
pub fn render_table(rows: &[TableRowData], totals: &TableTotals, show_type: bool) -> Markup {
    html! {
        table.data {
            thead {
                tr {
                    @for (i, heading) in COLUMNS.iter().enumerate() {
                        @if show_type || i != 1 {
                            th { (heading) }
                        }
                    }
                }
            }
            tbody {
                @for row in rows {
                    @let variation = row.variation();
                    tr {
                        td.label { (row.brand) }
                        @if show_type {
                            td.label { (row.content_type) }
                        }
                        td.label { (row.period) }
                        td.label { (row.prior_period) }
                        @for cell in row.numeric_cells() {
                            td { (cell) }
                        }
                        td class=(variation.trend.css_class()) { (variation.text) }
                    }
                }
            }
            tfoot {
                @let variation = format_variation(totals.rate_change_pct);
                tr.total {
                    td.label { "TOTAL" }
                    @if show_type {
                        td.label {}
                    }
                    td.label { (rows_label(rows.len())) }
                    td.label {}
                    @for cell in totals.numeric_cells() {
                        td { (cell) }
                    }
                    td class=(variation.trend.css_class()) { (variation.text) }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
