use maud::{html, Markup};
use stories_core::formatting::{
    format_count, format_optional, format_rate, format_variation, percent_change, Variation,
};
use stories_data::kpi::SummaryKpis;

// ── KpiCard ──────────────────────────────────────────────────────────────────

/// One headline figure with an optional year-over-year badge.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: String,
    pub variation: Option<Variation>,
    pub caption: String,
}

impl KpiCard {
    fn new(title: &'static str, value: String, caption: String) -> Self {
        Self {
            title,
            value,
            variation: None,
            caption,
        }
    }

    fn with_change(mut self, change_pct: Option<f64>) -> Self {
        self.variation = Some(format_variation(change_pct));
        self
    }
}

/// Build the KPI cards for the consolidated tab and the HTML report.
pub fn kpi_cards(kpis: &SummaryKpis) -> Vec<KpiCard> {
    let change = |cur: u64, pri: u64| percent_change(Some(cur as f64), Some(pri as f64));
    let (cur, pri) = (&kpis.current.totals, &kpis.prior.totals);

    let mut cards = vec![
        KpiCard::new(
            "Posts",
            format_count(cur.posts),
            format!("prior year: {}", format_count(pri.posts)),
        )
        .with_change(change(cur.posts, pri.posts)),
        KpiCard::new(
            "Impressions",
            format_count(cur.impressions),
            format!("prior year: {}", format_count(pri.impressions)),
        )
        .with_change(change(cur.impressions, pri.impressions)),
        KpiCard::new(
            "Reach",
            format_count(cur.reach),
            format!("prior year: {}", format_count(pri.reach)),
        )
        .with_change(change(cur.reach, pri.reach)),
        KpiCard::new(
            "Interactions",
            format_count(cur.interactions),
            format!("prior year: {}", format_count(pri.interactions)),
        )
        .with_change(change(cur.interactions, pri.interactions)),
        KpiCard::new(
            "Engagement rate",
            format_rate(kpis.current.engagement_rate),
            format!("prior year: {}", format_rate(kpis.prior.engagement_rate)),
        )
        .with_change(kpis.engagement_rate_change_pct),
        KpiCard::new(
            "Average engagement rate",
            format_rate(kpis.average_engagement_rate),
            format!(
                "mean of {} groups; prior year: {}",
                kpis.comparisons,
                format_rate(kpis.prior_average_engagement_rate)
            ),
        ),
        KpiCard::new(
            "Interactions per post",
            format_optional(kpis.current.interactions_per_post, 1),
            format!(
                "prior year: {}",
                format_optional(kpis.prior.interactions_per_post, 1)
            ),
        )
        .with_change(kpis.interactions_per_post_change_pct),
        KpiCard::new(
            "Replies per post",
            format_optional(kpis.current.replies_per_post, 1),
            format!(
                "prior year: {}",
                format_optional(kpis.prior.replies_per_post, 1)
            ),
        )
        .with_change(kpis.replies_per_post_change_pct),
        KpiCard::new(
            "Shares per post",
            format_optional(kpis.current.shares_per_post, 1),
            format!(
                "prior year: {}",
                format_optional(kpis.prior.shares_per_post, 1)
            ),
        )
        .with_change(kpis.shares_per_post_change_pct),
    ];

    if let Some(top) = &kpis.top_performer {
        cards.push(KpiCard::new(
            "Top performer",
            format_rate(Some(top.engagement_rate)),
            top.label.clone(),
        ));
    }
    if let Some(bottom) = &kpis.bottom_performer {
        cards.push(KpiCard::new(
            "Bottom performer",
            format_rate(Some(bottom.engagement_rate)),
            bottom.label.clone(),
        ));
    }
    cards
}

pub fn render_kpi_cards(cards: &[KpiCard]) -> Markup {
    html! {
        div.kpi-grid {
            @for card in cards {
                div.kpi-card {
                    div.kpi-title { (card.title) }
                    div.kpi-value { (card.value) }
                    @if let Some(variation) = &card.variation {
                        div class=(variation.trend.css_class()) { (variation.text) }
                    }
                    div.kpi-caption { (card.caption) }
                }
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
