//! The filtered dashboard view shared by the page, the JSON API and the
//! exported reports.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use stories_core::models::{AnalysisOptions, ComparisonResult, Granularity};
use stories_core::Result;
use stories_data::analysis::{analyze, AnalysisMetadata, AnalysisResult};
use stories_data::filter::FilterSpec;
use stories_data::kpi::SummaryKpis;

use crate::session::DashboardSession;

/// What the visitor asked to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: FilterSpec,
    /// Overrides the session's granularity when set.
    pub granularity: Option<Granularity>,
}

/// Inclusive range of publication dates across both uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Names and sizes of the two uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub current_file: String,
    pub prior_file: String,
    pub current_rows: usize,
    pub prior_rows: usize,
}

/// Everything rendered for one filter selection.
///
/// Exports are built from this same value, so their totals always equal the
/// totals shown on the page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Local>,
    pub options: AnalysisOptions,
    pub filter: FilterSpec,
    pub kpis: SummaryKpis,
    /// Brand-level comparisons (content types summed).
    pub brand_comparisons: Vec<ComparisonResult>,
    /// Brand × content type comparisons.
    pub comparisons: Vec<ComparisonResult>,
    /// Filter choices offered to the visitor (union of both uploads).
    pub available_brands: Vec<String>,
    pub available_content_types: Vec<String>,
    pub date_span: Option<DateSpan>,
    pub sources: SourceInfo,
    pub metadata: AnalysisMetadata,
}

impl DashboardView {
    /// Aggregate, compare, filter and summarise a session's data.
    ///
    /// Fails with `NoData` when the filter leaves nothing to show.
    pub fn build(session: &DashboardSession, query: &ViewQuery) -> Result<Self> {
        let options = AnalysisOptions {
            granularity: query.granularity.unwrap_or(session.options.granularity),
            ..session.options
        };

        let AnalysisResult {
            comparisons,
            metadata,
        } = analyze(&session.current, &session.prior, &options);
        let comparisons = query.filter.select(&comparisons)?;
        let brand_comparisons = AnalysisResult::rollup(&comparisons, &options);
        let kpis = SummaryKpis::compute(&comparisons, options.zero_reach);

        let available_brands: BTreeSet<String> = session
            .current
            .brands()
            .into_iter()
            .chain(session.prior.brands())
            .collect();
        let available_content_types: BTreeSet<String> = session
            .current
            .content_types()
            .into_iter()
            .chain(session.prior.content_types())
            .collect();

        let date_span = [session.current.date_span(), session.prior.date_span()]
            .into_iter()
            .flatten()
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)))
            .map(|(from, to)| DateSpan { from, to });

        Ok(Self {
            generated_at: Local::now(),
            options,
            filter: query.filter.clone(),
            kpis,
            brand_comparisons,
            comparisons,
            available_brands: available_brands.into_iter().collect(),
            available_content_types: available_content_types.into_iter().collect(),
            date_span,
            sources: SourceInfo {
                current_file: session.current.source_name.clone(),
                prior_file: session.prior.source_name.clone(),
                current_rows: session.current.rows.len(),
                prior_rows: session.prior.rows.len(),
            },
            metadata,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
