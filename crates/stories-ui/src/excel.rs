//! XLSX export.
//!
//! Sheets: `Summary` (KPIs plus the chart data and a native column chart),
//! `Comparison` (brand level) and `Comparison_Type` (brand × content type).
//! Rates are written as fractions with a percent number format.

use rust_xlsxwriter::{Chart, ChartType, Color, Format, Workbook, Worksheet, XlsxError};
use stories_core::models::MetricTotals;
use stories_core::{DashboardError, Result};
use stories_runtime::view::DashboardView;
use tracing::debug;

use crate::charts::BrandSeries;
use crate::html_report::{describe_filter, REPORT_TITLE};
use crate::table_view::{build_rows, rows_label, TableRowData, TableTotals, COLUMNS};

pub const SUMMARY_SHEET: &str = "Summary";
pub const COMPARISON_SHEET: &str = "Comparison";
pub const COMPARISON_TYPE_SHEET: &str = "Comparison_Type";

const RATE_FORMAT: &str = "0.00%";
const DELTA_FORMAT: &str = "+0.00%;-0.00%;0.00%";
const COUNT_FORMAT: &str = "#,##0";
const DECIMAL_FORMAT: &str = "0.0";

/// First row of the summary KPI table (0-based).
const SUMMARY_TABLE_ROW: u32 = 4;

// ── Summary lines ─────────────────────────────────────────────────────────────

/// How a summary value is formatted in the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Count,
    Rate,
    Decimal,
}

/// One KPI row of the `Summary` sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryLine {
    pub metric: &'static str,
    pub kind: ValueKind,
    pub current: Option<f64>,
    pub prior: Option<f64>,
    /// Relative change in percent.
    pub change_pct: Option<f64>,
}

/// KPI rows in sheet order, taken from the view's KPIs.
pub fn summary_lines(view: &DashboardView) -> Vec<SummaryLine> {
    let kpis = &view.kpis;
    let count_line = |metric, f: fn(&MetricTotals) -> u64| {
        let (cur, pri) = (f(&kpis.current.totals) as f64, f(&kpis.prior.totals) as f64);
        SummaryLine {
            metric,
            kind: ValueKind::Count,
            current: Some(cur),
            prior: Some(pri),
            change_pct: stories_core::formatting::percent_change(Some(cur), Some(pri)),
        }
    };
    vec![
        count_line("Posts", |t| t.posts),
        count_line("Impressions", |t| t.impressions),
        count_line("Reach", |t| t.reach),
        count_line("Interactions", |t| t.interactions),
        SummaryLine {
            metric: "Engagement rate",
            kind: ValueKind::Rate,
            current: kpis.current.engagement_rate,
            prior: kpis.prior.engagement_rate,
            change_pct: kpis.engagement_rate_change_pct,
        },
        SummaryLine {
            metric: "Average engagement rate",
            kind: ValueKind::Rate,
            current: kpis.average_engagement_rate,
            prior: kpis.prior_average_engagement_rate,
            change_pct: stories_core::formatting::percent_change(
                kpis.average_engagement_rate,
                kpis.prior_average_engagement_rate,
            ),
        },
        SummaryLine {
            metric: "Interactions per post",
            kind: ValueKind::Decimal,
            current: kpis.current.interactions_per_post,
            prior: kpis.prior.interactions_per_post,
            change_pct: kpis.interactions_per_post_change_pct,
        },
        SummaryLine {
            metric: "Replies per post",
            kind: ValueKind::Decimal,
            current: kpis.current.replies_per_post,
            prior: kpis.prior.replies_per_post,
            change_pct: kpis.replies_per_post_change_pct,
        },
        SummaryLine {
            metric: "Shares per post",
            kind: ValueKind::Decimal,
            current: kpis.current.shares_per_post,
            prior: kpis.prior.shares_per_post,
            change_pct: kpis.shares_per_post_change_pct,
        },
    ]
}

// ── Workbook ──────────────────────────────────────────────────────────────────

struct Formats {
    bold: Format,
    header: Format,
    count: Format,
    rate: Format,
    delta: Format,
    decimal: Format,
    total: Format,
    total_count: Format,
    total_decimal: Format,
    total_rate: Format,
    total_delta: Format,
}

impl Formats {
    fn new() -> Self {
        let total_bg = Color::RGB(0xFFF4D6);
        Self {
            bold: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xECEFF4)),
            count: Format::new().set_num_format(COUNT_FORMAT),
            rate: Format::new().set_num_format(RATE_FORMAT),
            delta: Format::new().set_num_format(DELTA_FORMAT),
            decimal: Format::new().set_num_format(DECIMAL_FORMAT),
            total: Format::new().set_bold().set_background_color(total_bg),
            total_count: Format::new()
                .set_bold()
                .set_background_color(total_bg)
                .set_num_format(COUNT_FORMAT),
            total_decimal: Format::new()
                .set_bold()
                .set_background_color(total_bg)
                .set_num_format(DECIMAL_FORMAT),
            total_rate: Format::new()
                .set_bold()
                .set_background_color(total_bg)
                .set_num_format(RATE_FORMAT),
            total_delta: Format::new()
                .set_bold()
                .set_background_color(total_bg)
                .set_num_format(DELTA_FORMAT),
        }
    }
}

/// Render the workbook for `view` into memory.
pub fn render_workbook(view: &DashboardView) -> Result<Vec<u8>> {
    build_workbook(view).map_err(DashboardError::export)
}

fn build_workbook(view: &DashboardView) -> std::result::Result<Vec<u8>, XlsxError> {
    let formats = Formats::new();
    let totals = TableTotals::from_kpis(&view.kpis);
    let mut workbook = Workbook::new();

    write_summary(workbook.add_worksheet(), view, &formats)?;
    write_comparison(
        workbook.add_worksheet(),
        COMPARISON_SHEET,
        &build_rows(&view.brand_comparisons),
        &totals,
        &formats,
    )?;
    write_comparison(
        workbook.add_worksheet(),
        COMPARISON_TYPE_SHEET,
        &build_rows(&view.comparisons),
        &totals,
        &formats,
    )?;

    let bytes = workbook.save_to_buffer()?;
    debug!(bytes = bytes.len(), "workbook rendered");
    Ok(bytes)
}

fn write_optional(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: Option<f64>,
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    if let Some(value) = value {
        sheet.write_number_with_format(row, col, value, format)?;
    }
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    view: &DashboardView,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name(SUMMARY_SHEET)?;
    sheet.set_column_width(0, 28)?;
    sheet.set_column_width(1, 18)?;
    sheet.set_column_width(2, 18)?;
    sheet.set_column_width(3, 14)?;

    sheet.write_string_with_format(0, 0, REPORT_TITLE, &formats.bold)?;
    sheet.write_string(
        1,
        0,
        format!(
            "Generated on {}",
            view.generated_at.format("%Y-%m-%d %H:%M:%S")
        ),
    )?;
    sheet.write_string(2, 0, describe_filter(view))?;

    for (col, heading) in ["Metric", "Current year", "Prior year", "Change"]
        .iter()
        .enumerate()
    {
        sheet.write_string_with_format(SUMMARY_TABLE_ROW, col as u16, *heading, &formats.header)?;
    }

    let mut row = SUMMARY_TABLE_ROW + 1;
    for line in summary_lines(view) {
        let format = match line.kind {
            ValueKind::Count => &formats.count,
            ValueKind::Rate => &formats.rate,
            ValueKind::Decimal => &formats.decimal,
        };
        sheet.write_string(row, 0, line.metric)?;
        write_optional(sheet, row, 1, line.current, format)?;
        write_optional(sheet, row, 2, line.prior, format)?;
        write_optional(sheet, row, 3, line.change_pct.map(|p| p / 100.0), &formats.delta)?;
        row += 1;
    }

    for (title, performer) in [
        ("Top performer", &view.kpis.top_performer),
        ("Bottom performer", &view.kpis.bottom_performer),
    ] {
        if let Some(p) = performer {
            sheet.write_string(row, 0, title)?;
            sheet.write_string(row, 1, p.label.as_str())?;
            sheet.write_number_with_format(row, 2, p.engagement_rate, &formats.rate)?;
            row += 1;
        }
    }

    // Chart data: engagement rate per brand, current vs prior.
    let series = BrandSeries::from_comparisons(&view.comparisons, view.options.zero_reach);
    let data_row = row + 2;
    sheet.write_string_with_format(data_row, 0, "Brand", &formats.header)?;
    sheet.write_string_with_format(data_row, 1, "Rate (current year)", &formats.header)?;
    sheet.write_string_with_format(data_row, 2, "Rate (prior year)", &formats.header)?;
    for (i, brand) in series.brands.iter().enumerate() {
        let r = data_row + 1 + i as u32;
        sheet.write_string(r, 0, brand.as_str())?;
        write_optional(sheet, r, 1, series.current_rate[i], &formats.rate)?;
        write_optional(sheet, r, 2, series.prior_rate[i], &formats.rate)?;
    }

    if !series.brands.is_empty() {
        let first = data_row + 1;
        let last = data_row + series.brands.len() as u32;
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_categories((SUMMARY_SHEET, first, 0, last, 0))
            .set_values((SUMMARY_SHEET, first, 1, last, 1))
            .set_name("Current year");
        chart
            .add_series()
            .set_categories((SUMMARY_SHEET, first, 0, last, 0))
            .set_values((SUMMARY_SHEET, first, 2, last, 2))
            .set_name("Prior year");
        chart.title().set_name("Engagement rate per brand");
        chart.y_axis().set_num_format(RATE_FORMAT);
        sheet.insert_chart(SUMMARY_TABLE_ROW, 5, &chart)?;
    }
    Ok(())
}

fn write_comparison(
    sheet: &mut Worksheet,
    name: &str,
    rows: &[TableRowData],
    totals: &TableTotals,
    formats: &Formats,
) -> std::result::Result<(), XlsxError> {
    sheet.set_name(name)?;
    for (col, heading) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *heading, &formats.header)?;
        sheet.set_column_width(col as u16, if col < 2 { 20 } else { 14 })?;
    }

    let mut row = 1u32;
    for data in rows {
        sheet.write_string(row, 0, data.brand.as_str())?;
        sheet.write_string(row, 1, data.content_type.as_str())?;
        sheet.write_string(row, 2, data.period.as_str())?;
        sheet.write_string(row, 3, data.prior_period.as_str())?;
        write_values(
            sheet,
            row,
            data.current,
            data.prior,
            (data.current_rate, data.prior_rate, data.rate_delta, data.rate_change_pct),
            (&formats.count, &formats.decimal, &formats.rate, &formats.delta),
        )?;
        row += 1;
    }

    sheet.write_string_with_format(row, 0, "TOTAL", &formats.total)?;
    for col in 1..4 {
        sheet.write_blank(row, col, &formats.total)?;
    }
    sheet.write_string_with_format(row, 2, rows_label(rows.len()), &formats.total)?;
    write_values(
        sheet,
        row,
        Some(totals.current),
        Some(totals.prior),
        (
            totals.current_rate,
            totals.prior_rate,
            totals.rate_delta,
            totals.rate_change_pct,
        ),
        (
            &formats.total_count,
            &formats.total_decimal,
            &formats.total_rate,
            &formats.total_delta,
        ),
    )?;
    Ok(())
}

/// Write columns 4.. of a comparison row.
fn write_values(
    sheet: &mut Worksheet,
    row: u32,
    current: Option<MetricTotals>,
    prior: Option<MetricTotals>,
    rates: (Option<f64>, Option<f64>, Option<f64>, Option<f64>),
    formats: (&Format, &Format, &Format, &Format),
) -> std::result::Result<(), XlsxError> {
    let (count, decimal, rate, delta) = formats;
    let counts: [fn(&MetricTotals) -> u64; 4] = [
        |t| t.posts,
        |t| t.impressions,
        |t| t.reach,
        |t| t.interactions,
    ];
    for (i, f) in counts.iter().enumerate() {
        let col = 4 + 2 * i as u16;
        write_optional(sheet, row, col, current.map(|t| f(&t) as f64), count)?;
        write_optional(sheet, row, col + 1, prior.map(|t| f(&t) as f64), count)?;
    }
    let means: [fn(&MetricTotals) -> Option<f64>; 2] =
        [MetricTotals::replies_per_post, MetricTotals::shares_per_post];
    for (i, f) in means.iter().enumerate() {
        let col = 12 + 2 * i as u16;
        write_optional(sheet, row, col, current.as_ref().and_then(f), decimal)?;
        write_optional(sheet, row, col + 1, prior.as_ref().and_then(f), decimal)?;
    }
    let (current_rate, prior_rate, rate_delta, change_pct) = rates;
    write_optional(sheet, row, 16, current_rate, rate)?;
    write_optional(sheet, row, 17, prior_rate, rate)?;
    write_optional(sheet, row, 18, rate_delta, delta)?;
    write_optional(sheet, row, 19, change_pct.map(|p| p / 100.0), delta)?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
