use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::time_utils::PeriodBucket;

/// Label used for the content-type column of brand-level roll-ups.
pub const ALL_CONTENT_TYPES: &str = "All types";

/// Which of the two uploaded exports a dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The current-year export.
    Current,
    /// The prior-year export.
    Prior,
}

impl Period {
    /// Human-readable label shown in tables and chart legends.
    pub fn label(self) -> &'static str {
        match self {
            Period::Current => "Current year",
            Period::Prior => "Prior year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Current => f.write_str("current"),
            Period::Prior => f.write_str("prior"),
        }
    }
}

/// Reporting granularity used to truncate observation dates.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Monthly,
    Quarterly,
    /// Whole calendar year; reproduces the plain "last year vs this year" view.
    Yearly,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Monthly => "monthly",
            Granularity::Quarterly => "quarterly",
            Granularity::Yearly => "yearly",
        }
    }

    /// Parse a query-string value; unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Some(Granularity::Monthly),
            "quarterly" | "quarter" | "q" => Some(Granularity::Quarterly),
            "yearly" | "year" | "y" => Some(Granularity::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the engagement rate is reported for groups with zero reach.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ZeroReachPolicy {
    /// Report a rate of `0.0`.
    #[default]
    Zero,
    /// Leave the rate absent.
    Missing,
}

impl ZeroReachPolicy {
    /// `interactions / reach`, with the zero-reach case resolved by the policy.
    pub fn rate(self, interactions: u64, reach: u64) -> Option<f64> {
        if reach == 0 {
            return match self {
                ZeroReachPolicy::Zero => Some(0.0),
                ZeroReachPolicy::Missing => None,
            };
        }
        Some(interactions as f64 / reach as f64)
    }
}

/// How a comparison reports a side that has no rows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum MissingSidePolicy {
    /// The side is marked absent.
    #[default]
    Absent,
    /// The side is filled with an all-zero summary.
    Zero,
}

/// Options that shape aggregation and comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub granularity: Granularity,
    pub zero_reach: ZeroReachPolicy,
    pub missing_side: MissingSidePolicy,
}

/// One observation read from an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    /// Content owner, either read directly or derived from the account name.
    pub brand: String,
    /// Raw account name (equal to `brand` when the export has a brand column).
    pub account: String,
    /// Publication type, e.g. `"Story"`.
    pub content_type: String,
    /// Publication timestamp (naive, as exported).
    pub published_at: NaiveDateTime,
    pub impressions: u64,
    pub reach: u64,
    pub interactions: u64,
    /// Story replies, when the export carries them.
    #[serde(default)]
    pub replies: Option<u64>,
    /// Story shares, when the export carries them.
    #[serde(default)]
    pub shares: Option<u64>,
}

impl MetricRow {
    pub fn date(&self) -> NaiveDate {
        self.published_at.date()
    }
}

/// All rows of one validated upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub period: Period,
    /// Original file name of the upload, for display only.
    pub source_name: String,
    pub rows: Vec<MetricRow>,
}

impl Dataset {
    pub fn new(period: Period, source_name: impl Into<String>, rows: Vec<MetricRow>) -> Self {
        Self {
            period,
            source_name: source_name.into(),
            rows,
        }
    }

    /// Distinct brands, sorted.
    pub fn brands(&self) -> BTreeSet<String> {
        self.rows.iter().map(|r| r.brand.clone()).collect()
    }

    /// Distinct content types, sorted.
    pub fn content_types(&self) -> BTreeSet<String> {
        self.rows.iter().map(|r| r.content_type.clone()).collect()
    }

    /// Earliest and latest publication date, or `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(MetricRow::date).min()?;
        let max = self.rows.iter().map(MetricRow::date).max()?;
        Some((min, max))
    }
}

/// Summed counters for a group of rows.
///
/// Sums saturate at `u64::MAX` instead of wrapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricTotals {
    /// Number of posts (rows) in the group.
    pub posts: u64,
    pub impressions: u64,
    pub reach: u64,
    pub interactions: u64,
    pub replies: u64,
    pub shares: u64,
    /// Posts whose export carried a replies value.
    #[serde(default)]
    pub replied_posts: u64,
    /// Posts whose export carried a shares value.
    #[serde(default)]
    pub shared_posts: u64,
}

impl MetricTotals {
    /// Add a single row's counts to the running totals.
    pub fn add_row(&mut self, row: &MetricRow) {
        self.posts = self.posts.saturating_add(1);
        self.impressions = self.impressions.saturating_add(row.impressions);
        self.reach = self.reach.saturating_add(row.reach);
        self.interactions = self.interactions.saturating_add(row.interactions);
        if let Some(replies) = row.replies {
            self.replies = self.replies.saturating_add(replies);
            self.replied_posts = self.replied_posts.saturating_add(1);
        }
        if let Some(shares) = row.shares {
            self.shares = self.shares.saturating_add(shares);
            self.shared_posts = self.shared_posts.saturating_add(1);
        }
    }

    /// Add another group's totals.
    pub fn merge(&mut self, other: &MetricTotals) {
        self.posts = self.posts.saturating_add(other.posts);
        self.impressions = self.impressions.saturating_add(other.impressions);
        self.reach = self.reach.saturating_add(other.reach);
        self.interactions = self.interactions.saturating_add(other.interactions);
        self.replies = self.replies.saturating_add(other.replies);
        self.shares = self.shares.saturating_add(other.shares);
        self.replied_posts = self.replied_posts.saturating_add(other.replied_posts);
        self.shared_posts = self.shared_posts.saturating_add(other.shared_posts);
    }

    pub fn engagement_rate(&self, policy: ZeroReachPolicy) -> Option<f64> {
        policy.rate(self.interactions, self.reach)
    }

    /// Mean interactions per post, `None` for an empty group.
    pub fn interactions_per_post(&self) -> Option<f64> {
        per_post(self.interactions, self.posts)
    }

    /// Mean replies over the posts that reported replies.
    pub fn replies_per_post(&self) -> Option<f64> {
        per_post(self.replies, self.replied_posts)
    }

    /// Mean shares over the posts that reported shares.
    pub fn shares_per_post(&self) -> Option<f64> {
        per_post(self.shares, self.shared_posts)
    }
}

fn per_post(total: u64, posts: u64) -> Option<f64> {
    if posts == 0 {
        None
    } else {
        Some(total as f64 / posts as f64)
    }
}

/// Aggregated metrics for one (brand, content type, bucket) group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngagementSummary {
    pub brand: String,
    pub content_type: String,
    pub bucket: PeriodBucket,
    pub totals: MetricTotals,
    /// `interactions / reach`; see [`ZeroReachPolicy`] for the zero-reach case.
    pub engagement_rate: Option<f64>,
}

impl EngagementSummary {
    pub fn new(
        brand: impl Into<String>,
        content_type: impl Into<String>,
        bucket: PeriodBucket,
        totals: MetricTotals,
        policy: ZeroReachPolicy,
    ) -> Self {
        Self {
            brand: brand.into(),
            content_type: content_type.into(),
            bucket,
            engagement_rate: totals.engagement_rate(policy),
            totals,
        }
    }
}

/// A current-period group paired with the prior-period group one year earlier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub brand: String,
    pub content_type: String,
    /// Bucket on the current side.
    pub bucket: PeriodBucket,
    /// Bucket on the prior side (always one year before `bucket`).
    pub prior_bucket: PeriodBucket,
    pub current: Option<EngagementSummary>,
    pub prior: Option<EngagementSummary>,
    /// Current rate minus prior rate, when both are present.
    pub rate_delta: Option<f64>,
    /// Relative rate change in percent, when the prior rate is present and non-zero.
    pub rate_change_pct: Option<f64>,
}

impl ComparisonResult {
    pub fn new(
        brand: impl Into<String>,
        content_type: impl Into<String>,
        bucket: PeriodBucket,
        current: Option<EngagementSummary>,
        prior: Option<EngagementSummary>,
    ) -> Self {
        let current_rate = current.as_ref().and_then(|s| s.engagement_rate);
        let prior_rate = prior.as_ref().and_then(|s| s.engagement_rate);
        let rate_delta = match (current_rate, prior_rate) {
            (Some(c), Some(p)) => Some(c - p),
            _ => None,
        };
        let rate_change_pct = match (current_rate, prior_rate) {
            (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p * 100.0),
            _ => None,
        };
        Self {
            brand: brand.into(),
            content_type: content_type.into(),
            prior_bucket: bucket.shift_years(-1),
            bucket,
            current,
            prior,
            rate_delta,
            rate_change_pct,
        }
    }

    pub fn current_rate(&self) -> Option<f64> {
        self.current.as_ref().and_then(|s| s.engagement_rate)
    }

    pub fn prior_rate(&self) -> Option<f64> {
        self.prior.as_ref().and_then(|s| s.engagement_rate)
    }

    /// Totals of one side; an absent side counts as empty.
    pub fn totals(&self, period: Period) -> MetricTotals {
        let side = match period {
            Period::Current => self.current.as_ref(),
            Period::Prior => self.prior.as_ref(),
        };
        side.map(|s| s.totals).unwrap_or_default()
    }

    /// `"Brand / Type / 2024-01"` label used for performers and chart legends.
    pub fn label(&self) -> String {
        format!("{} / {} / {}", self.brand, self.content_type, self.bucket)
    }
}
