//! Year-over-year join of current and prior aggregates.
//!
//! A prior-period summary matches the current-period summary with the same
//! brand and content type whose bucket lies exactly one year later.

use std::collections::BTreeMap;

use stories_core::models::{
    AnalysisOptions, ComparisonResult, EngagementSummary, MetricTotals, MissingSidePolicy,
    ZeroReachPolicy, ALL_CONTENT_TYPES,
};
use stories_core::time_utils::PeriodBucket;
use tracing::debug;

type JoinKey = (String, String, PeriodBucket);

#[derive(Default)]
struct Sides {
    current: Option<EngagementSummary>,
    prior: Option<EngagementSummary>,
}

/// Join `current` and `prior` summaries into one comparison per key.
///
/// Keys present on one side only keep the other side absent, unless
/// `options.missing_side` asks for an all-zero fill. Output is sorted by
/// (brand, content type, current bucket).
pub fn compare(
    current: &[EngagementSummary],
    prior: &[EngagementSummary],
    options: &AnalysisOptions,
) -> Vec<ComparisonResult> {
    let mut joined: BTreeMap<JoinKey, Sides> = BTreeMap::new();

    for summary in current {
        let key = (
            summary.brand.clone(),
            summary.content_type.clone(),
            summary.bucket,
        );
        joined.entry(key).or_default().current = Some(summary.clone());
    }
    for summary in prior {
        let key = (
            summary.brand.clone(),
            summary.content_type.clone(),
            summary.bucket.shift_years(1),
        );
        joined.entry(key).or_default().prior = Some(summary.clone());
    }

    let mut one_sided = 0usize;
    let results: Vec<ComparisonResult> = joined
        .into_iter()
        .map(|((brand, content_type, bucket), sides)| {
            if sides.current.is_none() || sides.prior.is_none() {
                one_sided += 1;
            }
            let (current, prior) = fill_missing(&brand, &content_type, bucket, sides, options);
            ComparisonResult::new(brand, content_type, bucket, current, prior)
        })
        .collect();

    debug!(
        comparisons = results.len(),
        one_sided,
        "joined current and prior aggregates"
    );
    results
}

/// Collapse brand × content-type comparisons into one comparison per
/// (brand, bucket), summing each side and recomputing the rates.
///
/// A side is present in the roll-up when any contributing comparison has it.
pub fn rollup_by_brand(
    comparisons: &[ComparisonResult],
    zero_reach: ZeroReachPolicy,
) -> Vec<ComparisonResult> {
    #[derive(Default)]
    struct Acc {
        current: Option<MetricTotals>,
        prior: Option<MetricTotals>,
    }

    let mut map: BTreeMap<(String, PeriodBucket), Acc> = BTreeMap::new();
    for cmp in comparisons {
        let acc = map.entry((cmp.brand.clone(), cmp.bucket)).or_default();
        if let Some(side) = &cmp.current {
            acc.current.get_or_insert_with(MetricTotals::default).merge(&side.totals);
        }
        if let Some(side) = &cmp.prior {
            acc.prior.get_or_insert_with(MetricTotals::default).merge(&side.totals);
        }
    }

    map.into_iter()
        .map(|((brand, bucket), acc)| {
            let current = acc.current.map(|totals| {
                EngagementSummary::new(&*brand, ALL_CONTENT_TYPES, bucket, totals, zero_reach)
            });
            let prior = acc.prior.map(|totals| {
                EngagementSummary::new(
                    &*brand,
                    ALL_CONTENT_TYPES,
                    bucket.shift_years(-1),
                    totals,
                    zero_reach,
                )
            });
            ComparisonResult::new(brand, ALL_CONTENT_TYPES, bucket, current, prior)
        })
        .collect()
}

/// Apply [`MissingSidePolicy`] to a half-empty join.
fn fill_missing(
    brand: &str,
    content_type: &str,
    bucket: PeriodBucket,
    sides: Sides,
    options: &AnalysisOptions,
) -> (Option<EngagementSummary>, Option<EngagementSummary>) {
    match options.missing_side {
        MissingSidePolicy::Absent => (sides.current, sides.prior),
        MissingSidePolicy::Zero => {
            let zero = |b: PeriodBucket| {
                EngagementSummary::new(
                    brand,
                    content_type,
                    b,
                    MetricTotals::default(),
                    options.zero_reach,
                )
            };
            (
                Some(sides.current.unwrap_or_else(|| zero(bucket))),
                Some(sides.prior.unwrap_or_else(|| zero(bucket.shift_years(-1)))),
            )
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
