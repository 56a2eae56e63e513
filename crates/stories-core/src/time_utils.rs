use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::models::Granularity;

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Date-time layouts accepted in the publication column, tried in order.
///
/// Slash dates are month-first, matching the Meta Business Suite export.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a publication timestamp into a naive local date-time.
///
/// RFC 3339 values keep their wall-clock time (the offset is dropped, since
/// buckets are calendar based). Date-only values are placed at midnight.
/// Returns `None` for empty or unrecognised strings.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let normalised = if let Some(stripped) = s.strip_suffix('Z') {
        format!("{}+00:00", stripped)
    } else {
        s.to_string()
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
        return Some(dt.naive_local());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    debug!("could not parse timestamp \"{}\"", s);
    None
}

/// Parse a `YYYY-MM-DD` filter bound.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

// ── PeriodBucket ──────────────────────────────────────────────────────────────

/// A calendar period obtained by truncating a date to a [`Granularity`].
///
/// `index` is the month (1–12), the quarter (1–4) or `1` for yearly buckets.
/// Ordering is chronological within one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodBucket {
    year: i32,
    index: u32,
    granularity: Granularity,
}

impl PeriodBucket {
    /// Truncate `date` to the bucket that contains it.
    pub fn from_date(date: NaiveDate, granularity: Granularity) -> Self {
        let index = match granularity {
            Granularity::Monthly => date.month(),
            Granularity::Quarterly => (date.month() - 1) / 3 + 1,
            Granularity::Yearly => 1,
        };
        Self {
            year: date.year(),
            index,
            granularity,
        }
    }

    /// The same bucket `years` calendar years later (negative for earlier).
    pub fn shift_years(self, years: i32) -> Self {
        Self {
            year: self.year + years,
            ..self
        }
    }

    /// First day of the bucket.
    pub fn start_date(&self) -> NaiveDate {
        let month = match self.granularity {
            Granularity::Monthly => self.index,
            Granularity::Quarterly => (self.index - 1) * 3 + 1,
            Granularity::Yearly => 1,
        };
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day of the bucket (inclusive).
    pub fn end_date(&self) -> NaiveDate {
        let months = match self.granularity {
            Granularity::Monthly => 1,
            Granularity::Quarterly => 3,
            Granularity::Yearly => 12,
        };
        self.start_date()
            .checked_add_months(chrono::Months::new(months))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    /// `true` when the bucket shares at least one day with `[from, to]`.
    pub fn overlaps(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
        let after_start = to.map_or(true, |to| self.start_date() <= to);
        let before_end = from.map_or(true, |from| self.end_date() >= from);
        after_start && before_end
    }
}

impl fmt::Display for PeriodBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Monthly => write!(f, "{}-{:02}", self.year, self.index),
            Granularity::Quarterly => write!(f, "{}Q{}", self.year, self.index),
            Granularity::Yearly => write!(f, "{}", self.year),
        }
    }
}

impl Serialize for PeriodBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    // ── parse_timestamp ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_iso_date_only() {
        let ts = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(ts.date(), d(2024, 1, 15));
        assert_eq!(ts.time(), NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_iso_datetime_variants() {
        for s in [
            "2024-01-15 10:30:00",
            "2024-01-15 10:30",
            "2024-01-15T10:30:00",
            "2024-01-15T10:30:00.250",
        ] {
            let ts = parse_timestamp(s).unwrap_or_else(|| panic!("failed on {s}"));
            assert_eq!(ts.date(), d(2024, 1, 15), "{s}");
        }
    }

    #[test]
    fn test_parse_rfc3339_keeps_wall_clock() {
        let ts = parse_timestamp("2024-01-31T23:30:00-03:00").unwrap();
        assert_eq!(ts.date(), d(2024, 1, 31));
        let ts = parse_timestamp("2024-02-01T10:00:00Z").unwrap();
        assert_eq!(ts.date(), d(2024, 2, 1));
    }

    #[test]
    fn test_parse_month_first_export_format() {
        let ts = parse_timestamp("01/15/2024 10:30").unwrap();
        assert_eq!(ts.date(), d(2024, 1, 15));
        let ts = parse_timestamp("03/02/2023").unwrap();
        assert_eq!(ts.date(), d(2023, 3, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn test_parse_date_filter_bound() {
        assert_eq!(parse_date("2024-02-29"), Some(d(2024, 2, 29)));
        assert_eq!(parse_date("29/02/2024"), None);
    }

    // ── PeriodBucket ──────────────────────────────────────────────────────────

    #[test]
    fn test_bucket_labels() {
        let date = d(2024, 5, 17);
        assert_eq!(
            PeriodBucket::from_date(date, Granularity::Monthly).to_string(),
            "2024-05"
        );
        assert_eq!(
            PeriodBucket::from_date(date, Granularity::Quarterly).to_string(),
            "2024Q2"
        );
        assert_eq!(
            PeriodBucket::from_date(date, Granularity::Yearly).to_string(),
            "2024"
        );
    }

    #[test]
    fn test_bucket_quarter_boundaries() {
        let q = |m| PeriodBucket::from_date(d(2024, m, 1), Granularity::Quarterly).to_string();
        assert_eq!(q(1), "2024Q1");
        assert_eq!(q(3), "2024Q1");
        assert_eq!(q(4), "2024Q2");
        assert_eq!(q(10), "2024Q4");
        assert_eq!(q(12), "2024Q4");
    }

    #[test]
    fn test_bucket_start_and_end_dates() {
        let feb = PeriodBucket::from_date(d(2024, 2, 10), Granularity::Monthly);
        assert_eq!(feb.start_date(), d(2024, 2, 1));
        assert_eq!(feb.end_date(), d(2024, 2, 29));

        let q4 = PeriodBucket::from_date(d(2023, 11, 3), Granularity::Quarterly);
        assert_eq!(q4.start_date(), d(2023, 10, 1));
        assert_eq!(q4.end_date(), d(2023, 12, 31));

        let year = PeriodBucket::from_date(d(2023, 6, 1), Granularity::Yearly);
        assert_eq!(year.start_date(), d(2023, 1, 1));
        assert_eq!(year.end_date(), d(2023, 12, 31));
    }

    #[test]
    fn test_bucket_shift_years() {
        let b = PeriodBucket::from_date(d(2024, 1, 15), Granularity::Monthly);
        let prior = b.shift_years(-1);
        assert_eq!(prior.to_string(), "2023-01");
        assert_eq!(prior, PeriodBucket::from_date(d(2023, 1, 20), Granularity::Monthly));
        assert_eq!(prior.shift_years(1), b);
    }

    #[test]
    fn test_bucket_ordering_is_chronological() {
        let mut buckets = vec![
            PeriodBucket::from_date(d(2024, 3, 1), Granularity::Monthly),
            PeriodBucket::from_date(d(2023, 12, 1), Granularity::Monthly),
            PeriodBucket::from_date(d(2024, 1, 1), Granularity::Monthly),
        ];
        buckets.sort();
        let labels: Vec<String> = buckets.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["2023-12", "2024-01", "2024-03"]);
    }

    #[test]
    fn test_bucket_overlaps() {
        let jan = PeriodBucket::from_date(d(2024, 1, 15), Granularity::Monthly);
        assert!(jan.overlaps(None, None));
        assert!(jan.overlaps(Some(d(2024, 1, 31)), None));
        assert!(jan.overlaps(None, Some(d(2024, 1, 1))));
        assert!(!jan.overlaps(Some(d(2024, 2, 1)), None));
        assert!(!jan.overlaps(None, Some(d(2023, 12, 31))));
        assert!(jan.overlaps(Some(d(2023, 12, 1)), Some(d(2024, 3, 1))));
    }

    #[test]
    fn test_bucket_serializes_as_label() {
        let b = PeriodBucket::from_date(d(2024, 7, 4), Granularity::Quarterly);
        assert_eq!(serde_json::to_string(&b).unwrap(), "\"2024Q3\"");
    }
}
