//! Comparison filtering by brand, content type and date range.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stories_core::models::ComparisonResult;
use stories_core::{DashboardError, Result};

/// User-selected filter. Every criterion is optional; an empty set or an
/// absent bound places no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Exact brand names to keep.
    #[serde(default)]
    pub brands: BTreeSet<String>,
    /// Exact content types to keep.
    #[serde(default)]
    pub content_types: BTreeSet<String>,
    /// Inclusive lower date bound.
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

impl FilterSpec {
    pub fn is_unrestricted(&self) -> bool {
        self.brands.is_empty()
            && self.content_types.is_empty()
            && self.from.is_none()
            && self.to.is_none()
    }

    /// `true` when `cmp` passes every criterion.
    ///
    /// The date range keeps a comparison when its current or its prior bucket
    /// shares at least one day with `[from, to]`.
    pub fn matches(&self, cmp: &ComparisonResult) -> bool {
        if !self.brands.is_empty() && !self.brands.contains(&cmp.brand) {
            return false;
        }
        if !self.content_types.is_empty() && !self.content_types.contains(&cmp.content_type) {
            return false;
        }
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        cmp.bucket.overlaps(self.from, self.to) || cmp.prior_bucket.overlaps(self.from, self.to)
    }

    /// Keep the comparisons that match, preserving order.
    pub fn apply(&self, comparisons: &[ComparisonResult]) -> Vec<ComparisonResult> {
        comparisons
            .iter()
            .filter(|cmp| self.matches(cmp))
            .cloned()
            .collect()
    }

    /// Like [`FilterSpec::apply`] but an empty result is a
    /// [`DashboardError::NoData`].
    pub fn select(&self, comparisons: &[ComparisonResult]) -> Result<Vec<ComparisonResult>> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(DashboardError::NoData(format!(
                    "the start date {from} is after the end date {to}"
                )));
            }
        }
        let kept = self.apply(comparisons);
        if kept.is_empty() {
            return Err(DashboardError::NoData(
                "no records match the selected filters".to_string(),
            ));
        }
        Ok(kept)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
