//! Summary KPIs for a filtered comparison view.

use serde::Serialize;
use stories_core::formatting::percent_change;
use stories_core::models::{ComparisonResult, MetricTotals, Period, ZeroReachPolicy};

/// Totals of one side of the view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub totals: MetricTotals,
    /// Overall `interactions / reach` for the side.
    pub engagement_rate: Option<f64>,
    pub interactions_per_post: Option<f64>,
    /// Mean replies per post; `None` when neither export reported replies.
    pub replies_per_post: Option<f64>,
    pub shares_per_post: Option<f64>,
}

impl PeriodTotals {
    fn from_totals(totals: MetricTotals, zero_reach: ZeroReachPolicy) -> Self {
        Self {
            engagement_rate: totals.engagement_rate(zero_reach),
            interactions_per_post: totals.interactions_per_post(),
            replies_per_post: totals.replies_per_post(),
            shares_per_post: totals.shares_per_post(),
            totals,
        }
    }
}

/// The comparison with the highest or lowest current engagement rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performer {
    pub label: String,
    pub brand: String,
    pub content_type: String,
    pub bucket: String,
    pub engagement_rate: f64,
}

impl Performer {
    fn from_comparison(cmp: &ComparisonResult, rate: f64) -> Self {
        Self {
            label: cmp.label(),
            brand: cmp.brand.clone(),
            content_type: cmp.content_type.clone(),
            bucket: cmp.bucket.to_string(),
            engagement_rate: rate,
        }
    }
}

/// Headline figures shown above the consolidated table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryKpis {
    pub current: PeriodTotals,
    pub prior: PeriodTotals,
    /// Mean of the current-side rates that are present.
    pub average_engagement_rate: Option<f64>,
    /// Mean of the prior-side rates that are present.
    pub prior_average_engagement_rate: Option<f64>,
    /// Relative change of the overall engagement rate, in percent.
    pub engagement_rate_change_pct: Option<f64>,
    /// Relative change of interactions per post, in percent.
    pub interactions_per_post_change_pct: Option<f64>,
    pub replies_per_post_change_pct: Option<f64>,
    pub shares_per_post_change_pct: Option<f64>,
    pub top_performer: Option<Performer>,
    pub bottom_performer: Option<Performer>,
    /// Number of comparisons the figures were computed from.
    pub comparisons: usize,
}

impl SummaryKpis {
    /// Compute KPIs over `comparisons`. An empty slice yields empty totals and
    /// no performers.
    pub fn compute(comparisons: &[ComparisonResult], zero_reach: ZeroReachPolicy) -> Self {
        let mut current = MetricTotals::default();
        let mut prior = MetricTotals::default();
        for cmp in comparisons {
            current.merge(&cmp.totals(Period::Current));
            prior.merge(&cmp.totals(Period::Prior));
        }
        let current = PeriodTotals::from_totals(current, zero_reach);
        let prior = PeriodTotals::from_totals(prior, zero_reach);

        let ranked: Vec<(&ComparisonResult, f64)> = comparisons
            .iter()
            .filter_map(|cmp| cmp.current_rate().map(|rate| (cmp, rate)))
            .collect();

        // First comparison wins ties, so the result follows table order.
        let top = ranked.iter().fold(None::<&(&ComparisonResult, f64)>, |best, item| {
            match best {
                Some(b) if b.1 >= item.1 => Some(b),
                _ => Some(item),
            }
        });
        let bottom = ranked.iter().fold(None::<&(&ComparisonResult, f64)>, |worst, item| {
            match worst {
                Some(w) if w.1 <= item.1 => Some(w),
                _ => Some(item),
            }
        });

        Self {
            average_engagement_rate: mean(ranked.iter().map(|(_, rate)| *rate)),
            prior_average_engagement_rate: mean(comparisons.iter().filter_map(|c| c.prior_rate())),
            engagement_rate_change_pct: percent_change(
                current.engagement_rate,
                prior.engagement_rate,
            ),
            interactions_per_post_change_pct: percent_change(
                current.interactions_per_post,
                prior.interactions_per_post,
            ),
            replies_per_post_change_pct: percent_change(
                current.replies_per_post,
                prior.replies_per_post,
            ),
            shares_per_post_change_pct: percent_change(
                current.shares_per_post,
                prior.shares_per_post,
            ),
            top_performer: top.map(|(cmp, rate)| Performer::from_comparison(cmp, *rate)),
            bottom_performer: bottom.map(|(cmp, rate)| Performer::from_comparison(cmp, *rate)),
            comparisons: comparisons.len(),
            current,
            prior,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
