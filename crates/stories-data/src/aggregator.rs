//! Engagement aggregation over period buckets.
//!
//! Rows are grouped by (brand, content type, bucket), where the bucket is the
//! publication date truncated to the configured [`Granularity`].

use std::collections::BTreeMap;

use stories_core::models::{
    Dataset, EngagementSummary, Granularity, MetricRow, MetricTotals, ZeroReachPolicy,
};
use stories_core::time_utils::PeriodBucket;
use tracing::debug;

/// Grouping key; the derived ordering is the output order.
type GroupKey = (String, String, PeriodBucket);

// ── EngagementAggregator ──────────────────────────────────────────────────────

/// Stateless helper that groups metric rows into [`EngagementSummary`] values.
pub struct EngagementAggregator;

impl EngagementAggregator {
    /// Aggregate `rows` by (brand, content type, bucket).
    ///
    /// Returns summaries sorted by brand, content type and bucket. The number
    /// of summaries never exceeds the number of distinct keys in the input.
    pub fn aggregate(
        rows: &[MetricRow],
        granularity: Granularity,
        zero_reach: ZeroReachPolicy,
    ) -> Vec<EngagementSummary> {
        // BTreeMap keeps the keys sorted.
        let mut map: BTreeMap<GroupKey, MetricTotals> = BTreeMap::new();

        for row in rows {
            let bucket = PeriodBucket::from_date(row.date(), granularity);
            map.entry((row.brand.clone(), row.content_type.clone(), bucket))
                .or_default()
                .add_row(row);
        }

        debug!(
            rows = rows.len(),
            groups = map.len(),
            granularity = %granularity,
            "aggregated rows"
        );

        map.into_iter()
            .map(|((brand, content_type, bucket), totals)| {
                EngagementSummary::new(brand, content_type, bucket, totals, zero_reach)
            })
            .collect()
    }

    /// Aggregate every row of `dataset`.
    pub fn aggregate_dataset(
        dataset: &Dataset,
        granularity: Granularity,
        zero_reach: ZeroReachPolicy,
    ) -> Vec<EngagementSummary> {
        Self::aggregate(&dataset.rows, granularity, zero_reach)
    }

    /// Sum the totals of all `summaries`.
    pub fn calculate_totals<'a>(
        summaries: impl IntoIterator<Item = &'a EngagementSummary>,
    ) -> MetricTotals {
        let mut totals = MetricTotals::default();
        for summary in summaries {
            totals.merge(&summary.totals);
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn row(brand: &str, ctype: &str, date: &str, reach: u64, interactions: u64) -> MetricRow {
        MetricRow {
            brand: brand.to_string(),
            account: brand.to_string(),
            content_type: ctype.to_string(),
            published_at: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            impressions: reach * 2,
            reach,
            interactions,
            replies: None,
            shares: None,
        }
    }

    // ── aggregate ─────────────────────────────────────────────────────────────

    #[test]
    fn test_aggregate_groups_and_sums() {
        let rows = vec![
            row("A", "Photo", "2024-01-15", 800, 80),
            row("A", "Photo", "2024-01-28", 200, 20),
            row("A", "Photo", "2024-02-01", 100, 5),
        ];
        let out = EngagementAggregator::aggregate(&rows, Granularity::Monthly, ZeroReachPolicy::Zero);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bucket.to_string(), "2024-01");
        assert_eq!(out[0].totals.posts, 2);
        assert_eq!(out[0].totals.reach, 1000);
        assert_eq!(out[0].totals.interactions, 100);
        assert_eq!(out[0].totals.impressions, 2000);
        assert!((out[0].engagement_rate.unwrap() - 0.10).abs() < 1e-12);
        assert_eq!(out[1].bucket.to_string(), "2024-02");
    }

    #[test]
    fn test_aggregate_quarterly_merges_months() {
        let rows = vec![
            row("A", "Photo", "2024-01-15", 100, 10),
            row("A", "Photo", "2024-03-31", 100, 30),
            row("A", "Photo", "2024-04-01", 100, 1),
        ];
        let out =
            EngagementAggregator::aggregate(&rows, Granularity::Quarterly, ZeroReachPolicy::Zero);
        let labels: Vec<String> = out.iter().map(|s| s.bucket.to_string()).collect();
        assert_eq!(labels, vec!["2024Q1", "2024Q2"]);
        assert_eq!(out[0].totals.interactions, 40);
    }

    #[test]
    fn test_aggregate_sorted_by_brand_type_bucket() {
        let rows = vec![
            row("B", "Video", "2024-01-01", 1, 1),
            row("A", "Video", "2024-02-01", 1, 1),
            row("A", "Photo", "2024-03-01", 1, 1),
            row("A", "Photo", "2024-01-01", 1, 1),
        ];
        let out = EngagementAggregator::aggregate(&rows, Granularity::Monthly, ZeroReachPolicy::Zero);
        let keys: Vec<String> = out
            .iter()
            .map(|s| format!("{}/{}/{}", s.brand, s.content_type, s.bucket))
            .collect();
        assert_eq!(
            keys,
            vec![
                "A/Photo/2024-01",
                "A/Photo/2024-03",
                "A/Video/2024-02",
                "B/Video/2024-01"
            ]
        );
    }

    #[test]
    fn test_aggregate_count_bounded_by_distinct_keys() {
        let rows: Vec<MetricRow> = (1..=28)
            .map(|day| {
                let brand = if day % 2 == 0 { "A" } else { "B" };
                row(brand, "Story", &format!("2024-0{}-{:02}", day % 3 + 1, day), 10, 1)
            })
            .collect();
        for granularity in [Granularity::Monthly, Granularity::Quarterly, Granularity::Yearly] {
            let distinct: BTreeSet<_> = rows
                .iter()
                .map(|r| {
                    (
                        r.brand.clone(),
                        r.content_type.clone(),
                        PeriodBucket::from_date(r.date(), granularity),
                    )
                })
                .collect();
            let out = EngagementAggregator::aggregate(&rows, granularity, ZeroReachPolicy::Zero);
            assert!(out.len() <= distinct.len());
            assert_eq!(
                EngagementAggregator::calculate_totals(&out).posts,
                rows.len() as u64
            );
        }
    }

    #[test]
    fn test_aggregate_zero_reach_policies() {
        let rows = vec![row("A", "Story", "2024-01-01", 0, 3)];
        let zero = EngagementAggregator::aggregate(&rows, Granularity::Monthly, ZeroReachPolicy::Zero);
        assert_eq!(zero[0].engagement_rate, Some(0.0));
        let missing =
            EngagementAggregator::aggregate(&rows, Granularity::Monthly, ZeroReachPolicy::Missing);
        assert_eq!(missing[0].engagement_rate, None);
    }

    #[test]
    fn test_aggregate_rates_non_negative() {
        let rows = vec![
            row("A", "Story", "2024-01-01", 5, 0),
            row("B", "Story", "2024-01-01", 5, 50),
        ];
        for s in EngagementAggregator::aggregate(&rows, Granularity::Yearly, ZeroReachPolicy::Zero) {
            assert!(s.engagement_rate.unwrap() >= 0.0);
        }
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(
            EngagementAggregator::aggregate(&[], Granularity::Monthly, ZeroReachPolicy::Zero)
                .is_empty()
        );
    }
}
