//! Main analysis pipeline for the Stories Dashboard.
//!
//! Aggregates both datasets, joins them year over year and rolls the result
//! up per brand, returning an [`AnalysisResult`] ready for filtering.

use chrono::Utc;
use serde::Serialize;
use stories_core::models::{AnalysisOptions, ComparisonResult, Dataset, Granularity};
use tracing::info;

use crate::aggregator::EngagementAggregator;
use crate::comparison::{compare, rollup_by_brand};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    pub granularity: Granularity,
    /// Rows read from the current-year export.
    pub current_rows: usize,
    /// Rows read from the prior-year export.
    pub prior_rows: usize,
    /// Groups produced by aggregating the current-year export.
    pub current_groups: usize,
    /// Groups produced by aggregating the prior-year export.
    pub prior_groups: usize,
    /// Wall-clock seconds spent aggregating both datasets.
    pub aggregate_time_seconds: f64,
    /// Wall-clock seconds spent joining and rolling up.
    pub compare_time_seconds: f64,
}

/// The complete output of [`analyze`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// Brand × content type × bucket comparisons.
    pub comparisons: Vec<ComparisonResult>,
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline.
///
/// 1. Aggregate each dataset by (brand, content type, bucket).
/// 2. Join current buckets with prior buckets one year earlier.
/// 3. Return an [`AnalysisResult`].
pub fn analyze(current: &Dataset, prior: &Dataset, options: &AnalysisOptions) -> AnalysisResult {
    // ── Step 1: Aggregate ─────────────────────────────────────────────────────
    let aggregate_start = std::time::Instant::now();
    let current_summaries =
        EngagementAggregator::aggregate_dataset(current, options.granularity, options.zero_reach);
    let prior_summaries =
        EngagementAggregator::aggregate_dataset(prior, options.granularity, options.zero_reach);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    // ── Step 2: Compare ───────────────────────────────────────────────────────
    let compare_start = std::time::Instant::now();
    let comparisons = compare(&current_summaries, &prior_summaries, options);
    let compare_time = compare_start.elapsed().as_secs_f64();

    // ── Step 3: Build result ──────────────────────────────────────────────────
    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        granularity: options.granularity,
        current_rows: current.rows.len(),
        prior_rows: prior.rows.len(),
        current_groups: current_summaries.len(),
        prior_groups: prior_summaries.len(),
        aggregate_time_seconds: aggregate_time,
        compare_time_seconds: compare_time,
    };

    info!(
        comparisons = comparisons.len(),
        current_rows = metadata.current_rows,
        prior_rows = metadata.prior_rows,
        granularity = %options.granularity,
        "analysis complete"
    );

    AnalysisResult {
        comparisons,
        metadata,
    }
}

impl AnalysisResult {
    /// Brand-level roll-up of an already filtered comparison list.
    pub fn rollup(
        comparisons: &[ComparisonResult],
        options: &AnalysisOptions,
    ) -> Vec<ComparisonResult> {
        rollup_by_brand(comparisons, options.zero_reach)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_dataset;
    use stories_core::brands::BrandResolver;
    use stories_core::models::Period;

    const CURRENT: &str = "\
brand,content_type,date,impressions,reach,interactions
A,Photo,2024-01-15,1000,800,80
A,Video,2024-02-15,500,400,20
B,Photo,2024-01-03,300,100,9
";
    const PRIOR: &str = "\
brand,content_type,date,impressions,reach,interactions
A,Photo,2023-01-20,900,700,56
B,Photo,2023-05-01,300,100,3
";

    fn datasets() -> (Dataset, Dataset) {
        let brands = BrandResolver::default();
        (
            read_dataset(Period::Current, "cur.csv", CURRENT.as_bytes(), &brands).unwrap(),
            read_dataset(Period::Prior, "pri.csv", PRIOR.as_bytes(), &brands).unwrap(),
        )
    }

    #[test]
    fn test_analyze_monthly_pipeline() {
        let (current, prior) = datasets();
        let result = analyze(&current, &prior, &AnalysisOptions::default());

        // A/Photo/Jan joined, A/Video/Feb, B/Photo/Jan, B/Photo/May (prior only).
        assert_eq!(result.comparisons.len(), 4);
        assert_eq!(result.metadata.current_rows, 3);
        assert_eq!(result.metadata.prior_rows, 2);
        assert_eq!(result.metadata.current_groups, 3);
        assert_eq!(result.metadata.prior_groups, 2);
        assert!(!result.metadata.generated_at.is_empty());

        let joined = &result.comparisons[0];
        assert_eq!(joined.label(), "A / Photo / 2024-01");
        assert!((joined.rate_delta.unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_yearly_joins_everything() {
        let (current, prior) = datasets();
        let options = AnalysisOptions {
            granularity: Granularity::Yearly,
            ..AnalysisOptions::default()
        };
        let result = analyze(&current, &prior, &options);
        assert_eq!(result.comparisons.len(), 3);
        assert!(result
            .comparisons
            .iter()
            .filter(|c| c.content_type == "Photo")
            .all(|c| c.rate_delta.is_some()));
    }

    #[test]
    fn test_analyze_rollup() {
        let (current, prior) = datasets();
        let options = AnalysisOptions::default();
        let result = analyze(&current, &prior, &options);
        let rolled = AnalysisResult::rollup(&result.comparisons, &options);
        let labels: Vec<String> = rolled.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "A / All types / 2024-01",
                "A / All types / 2024-02",
                "B / All types / 2024-01",
                "B / All types / 2024-05"
            ]
        );
    }
}
