//! Plotly charts for the dashboard page and the HTML report.

use std::collections::BTreeMap;

use plotly::common::{Font, Marker, Mode, Title};
use plotly::layout::{Axis, BarMode};
use plotly::{Bar, Layout, Plot, Scatter};
use stories_core::models::{ComparisonResult, MetricTotals, Period, ZeroReachPolicy};
use stories_runtime::view::DashboardView;

use crate::themes::Theme;

pub const DEFAULT_WIDTH: usize = 800;
pub const DEFAULT_HEIGHT: usize = 500;

// ── BrandSeries ───────────────────────────────────────────────────────────────

/// Per-brand figures over the whole filtered range, current vs prior.
///
/// Shared by the plotly bar charts and the XLSX chart data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrandSeries {
    pub brands: Vec<String>,
    pub current_rate: Vec<Option<f64>>,
    pub prior_rate: Vec<Option<f64>>,
    pub current_interactions_per_post: Vec<Option<f64>>,
    pub prior_interactions_per_post: Vec<Option<f64>>,
    pub current_replies_per_post: Vec<Option<f64>>,
    pub prior_replies_per_post: Vec<Option<f64>>,
}

impl BrandSeries {
    pub fn from_comparisons(comparisons: &[ComparisonResult], zero_reach: ZeroReachPolicy) -> Self {
        let mut per_brand: BTreeMap<&str, (MetricTotals, MetricTotals)> = BTreeMap::new();
        for cmp in comparisons {
            let entry = per_brand.entry(cmp.brand.as_str()).or_default();
            entry.0.merge(&cmp.totals(Period::Current));
            entry.1.merge(&cmp.totals(Period::Prior));
        }

        let mut series = Self::default();
        for (brand, (current, prior)) in per_brand {
            series.brands.push(brand.to_string());
            series.current_rate.push(side_rate(&current, zero_reach));
            series.prior_rate.push(side_rate(&prior, zero_reach));
            series
                .current_interactions_per_post
                .push(current.interactions_per_post());
            series
                .prior_interactions_per_post
                .push(prior.interactions_per_post());
            series
                .current_replies_per_post
                .push(current.replies_per_post());
            series.prior_replies_per_post.push(prior.replies_per_post());
        }
        series
    }
}

/// Rate of one side; a side with no posts has no rate regardless of policy.
fn side_rate(totals: &MetricTotals, zero_reach: ZeroReachPolicy) -> Option<f64> {
    if totals.posts == 0 {
        None
    } else {
        totals.engagement_rate(zero_reach)
    }
}

fn as_percent(values: &[Option<f64>]) -> Vec<Option<f64>> {
    values.iter().map(|v| v.map(|r| r * 100.0)).collect()
}

// ── ChartSet ──────────────────────────────────────────────────────────────────

/// The dashboard charts.
pub struct ChartSet {
    pub current_trend: Plot,
    pub prior_trend: Plot,
    pub brand_rate: Plot,
    pub brand_interactions: Plot,
    pub brand_replies: Plot,
}

impl ChartSet {
    pub fn build(view: &DashboardView, theme: &Theme) -> Self {
        let series = BrandSeries::from_comparisons(&view.comparisons, view.options.zero_reach);
        Self {
            current_trend: rate_trend(&view.comparisons, Period::Current, theme),
            prior_trend: rate_trend(&view.comparisons, Period::Prior, theme),
            brand_rate: brand_bars(
                "Engagement rate per brand",
                "Engagement rate (%)",
                as_percent(&series.current_rate),
                as_percent(&series.prior_rate),
                &series.brands,
                theme,
            ),
            brand_interactions: brand_bars(
                "Interactions per post per brand",
                "Interactions per post",
                series.current_interactions_per_post.clone(),
                series.prior_interactions_per_post.clone(),
                &series.brands,
                theme,
            ),
            brand_replies: brand_bars(
                "Replies per post per brand",
                "Replies per post",
                series.current_replies_per_post.clone(),
                series.prior_replies_per_post.clone(),
                &series.brands,
                theme,
            ),
        }
    }

    /// Inline HTML fragments with unique div ids, in display order.
    ///
    /// The page must load the plotly script once for these to render.
    pub fn to_inline_html(&self, id_prefix: &str) -> Vec<String> {
        [
            (&self.current_trend, "current-trend"),
            (&self.prior_trend, "prior-trend"),
            (&self.brand_rate, "brand-rate"),
            (&self.brand_interactions, "brand-interactions"),
            (&self.brand_replies, "brand-replies"),
        ]
        .into_iter()
        .map(|(plot, name)| {
            let div_id = format!("{id_prefix}-{name}");
            plot.to_inline_html(Some(div_id.as_str()))
        })
        .collect()
    }
}

// ── Chart builders ────────────────────────────────────────────────────────────

fn base_layout(title: &str, y_title: &str, theme: &Theme) -> Layout {
    Layout::new()
        .title(Title::with_text(title))
        .width(DEFAULT_WIDTH)
        .height(DEFAULT_HEIGHT)
        .paper_background_color(theme.surface)
        .plot_background_color(theme.surface)
        .font(Font::new().color(theme.text))
        .y_axis(Axis::new().title(Title::with_text(y_title)))
}

/// Engagement rate per bucket, one line per brand / content type.
///
/// The prior side is plotted against its own (one year earlier) buckets.
pub fn rate_trend(comparisons: &[ComparisonResult], period: Period, theme: &Theme) -> Plot {
    let mut lines: BTreeMap<(&str, &str), Vec<(String, f64)>> = BTreeMap::new();
    for cmp in comparisons {
        let point = match period {
            Period::Current => cmp.current_rate().map(|r| (cmp.bucket.to_string(), r)),
            Period::Prior => cmp.prior_rate().map(|r| (cmp.prior_bucket.to_string(), r)),
        };
        if let Some(point) = point {
            lines
                .entry((cmp.brand.as_str(), cmp.content_type.as_str()))
                .or_default()
                .push(point);
        }
    }

    let mut plot = Plot::new();
    for (i, ((brand, content_type), mut points)) in lines.into_iter().enumerate() {
        points.sort_by(|a, b| a.0.cmp(&b.0));
        let (x, y): (Vec<String>, Vec<f64>) =
            points.into_iter().map(|(label, r)| (label, r * 100.0)).unzip();
        let name = format!("{brand} / {content_type}");
        let trace = Scatter::new(x, y)
            .mode(Mode::LinesMarkers)
            .name(name.as_str())
            .marker(Marker::new().color(theme.series_color(i)));
        plot.add_trace(trace);
    }

    let title = format!("Engagement rate by period ({})", period.label().to_lowercase());
    plot.set_layout(base_layout(&title, "Engagement rate (%)", theme));
    plot
}

fn brand_bars(
    title: &str,
    y_title: &str,
    current: Vec<Option<f64>>,
    prior: Vec<Option<f64>>,
    brands: &[String],
    theme: &Theme,
) -> Plot {
    let mut plot = Plot::new();
    plot.add_trace(
        Bar::new(brands.to_vec(), current)
            .name(Period::Current.label())
            .marker(Marker::new().color(theme.current_series)),
    );
    plot.add_trace(
        Bar::new(brands.to_vec(), prior)
            .name(Period::Prior.label())
            .marker(Marker::new().color(theme.prior_series)),
    );
    plot.set_layout(base_layout(title, y_title, theme).bar_mode(BarMode::Group));
    plot
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use stories_core::models::{EngagementSummary, Granularity};
    use stories_core::time_utils::PeriodBucket;

    fn totals(posts: u64, reach: u64, interactions: u64) -> MetricTotals {
        MetricTotals {
            posts,
            impressions: reach,
            reach,
            interactions,
            ..MetricTotals::default()
        }
    }

    fn cmp(
        brand: &str,
        ctype: &str,
        month: u32,
        cur: Option<MetricTotals>,
        pri: Option<MetricTotals>,
    ) -> ComparisonResult {
        let bucket = PeriodBucket::from_date(
            chrono::NaiveDate::from_ymd_opt(2024, month, 1).unwrap(),
            Granularity::Monthly,
        );
        let policy = ZeroReachPolicy::Zero;
        ComparisonResult::new(
            brand,
            ctype,
            bucket,
            cur.map(|t| EngagementSummary::new(brand, ctype, bucket, t, policy)),
            pri.map(|t| EngagementSummary::new(brand, ctype, bucket.shift_years(-1), t, policy)),
        )
    }

    fn sample() -> Vec<ComparisonResult> {
        vec![
            cmp("A", "Photo", 1, Some(totals(1, 100, 10)), Some(totals(1, 100, 5))),
            cmp("A", "Video", 2, Some(totals(1, 300, 30)), None),
            cmp("B", "Photo", 1, None, Some(totals(2, 200, 40))),
        ]
    }

    #[test]
    fn test_brand_series() {
        let series = BrandSeries::from_comparisons(&sample(), ZeroReachPolicy::Zero);
        assert_eq!(series.brands, vec!["A", "B"]);
        assert!((series.current_rate[0].unwrap() - 0.10).abs() < 1e-12);
        assert!((series.prior_rate[0].unwrap() - 0.05).abs() < 1e-12);
        // B has no current posts: no rate rather than a fabricated zero.
        assert_eq!(series.current_rate[1], None);
        assert_eq!(series.prior_interactions_per_post[1], Some(20.0));
    }

    #[test]
    fn test_rate_trend_traces() {
        let theme = Theme::light();
        let html = rate_trend(&sample(), Period::Current, &theme).to_inline_html(Some("t"));
        assert!(html.contains("A / Photo"));
        assert!(html.contains("A / Video"));
        assert!(!html.contains("B / Photo"));

        let prior = rate_trend(&sample(), Period::Prior, &theme).to_inline_html(Some("p"));
        assert!(prior.contains("2023-01"));
        assert!(prior.contains("B / Photo"));
    }

    #[test]
    fn test_brand_bars_grouped() {
        let theme = Theme::dark();
        let series = BrandSeries::from_comparisons(&sample(), ZeroReachPolicy::Zero);
        let html = brand_bars(
            "Engagement rate per brand",
            "Engagement rate (%)",
            as_percent(&series.current_rate),
            as_percent(&series.prior_rate),
            &series.brands,
            &theme,
        )
        .to_inline_html(Some("b"));
        assert!(html.contains("Current year"));
        assert!(html.contains("Prior year"));
        assert!(html.contains("group"));
        assert!(html.contains("Engagement rate per brand"));
        assert!(html.contains("Engagement rate (%)"));
    }

    #[test]
    fn test_brand_series_replies_per_post() {
        let with_replies = |posts, replies| MetricTotals {
            replies,
            replied_posts: posts,
            ..totals(posts, 100, 10)
        };
        let data = vec![
            cmp("A", "Photo", 1, Some(with_replies(2, 6)), Some(with_replies(1, 1))),
            cmp("A", "Video", 2, Some(with_replies(1, 0)), None),
            cmp("B", "Photo", 1, Some(totals(1, 100, 10)), None),
        ];
        let series = BrandSeries::from_comparisons(&data, ZeroReachPolicy::Zero);
        assert_eq!(series.current_replies_per_post, vec![Some(2.0), None]);
        assert_eq!(series.prior_replies_per_post, vec![Some(1.0), None]);
    }
}
