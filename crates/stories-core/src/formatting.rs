/// Placeholder rendered for absent values.
pub const MISSING: &str = "n/a";

/// Format `value` with comma thousands separators and `decimals` places.
///
/// A negative value that rounds to zero loses its sign.
///
/// ```
/// use stories_core::formatting::format_number;
///
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let factor = 10_f64.powi(decimals as i32);
    let scaled = value.abs() * factor;
    // Nudge binary midpoints such as 1.005 upwards before rounding.
    let rounded = (scaled + f64::EPSILON * scaled).round() / factor;
    let text = format!("{rounded:.prec$}", prec = decimals as usize);

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if value < 0.0 && text.bytes().any(|b| matches!(b, b'1'..=b'9')) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Format an integer count with thousands separators.
///
/// ```
/// use stories_core::formatting::format_count;
///
/// assert_eq!(format_count(1_250_000), "1,250,000");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format an engagement rate (a ratio) as a percentage with two decimals.
///
/// ```
/// use stories_core::formatting::format_rate;
///
/// assert_eq!(format_rate(Some(0.1)), "10.00%");
/// assert_eq!(format_rate(None), "n/a");
/// ```
pub fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{}%", format_number(r * 100.0, 2)),
        None => MISSING.to_string(),
    }
}

/// Format a rate difference in percentage points with an explicit sign.
///
/// ```
/// use stories_core::formatting::format_rate_delta;
///
/// assert_eq!(format_rate_delta(Some(0.02)), "+2.00 pp");
/// assert_eq!(format_rate_delta(Some(-0.005)), "-0.50 pp");
/// ```
pub fn format_rate_delta(delta: Option<f64>) -> String {
    match delta {
        Some(d) if d >= 0.0 => format!("+{} pp", format_number(d * 100.0, 2)),
        Some(d) => format!("{} pp", format_number(d * 100.0, 2)),
        None => MISSING.to_string(),
    }
}

/// Format an optional value with `decimals` places, or [`MISSING`].
pub fn format_optional(value: Option<f64>, decimals: u32) -> String {
    value
        .map(|v| format_number(v, decimals))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Relative change from `prior` to `current` in percent.
///
/// `None` when either side is absent or `prior` is zero.
pub fn percent_change(current: Option<f64>, prior: Option<f64>) -> Option<f64> {
    match (current, prior) {
        (Some(c), Some(p)) if p != 0.0 => Some((c - p) / p * 100.0),
        _ => None,
    }
}

// ── Variation ─────────────────────────────────────────────────────────────────

/// Direction of a period-over-period change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    /// CSS class used by the dashboard and the HTML report.
    pub fn css_class(self) -> &'static str {
        match self {
            Trend::Up => "trend-up",
            Trend::Down => "trend-down",
            Trend::Flat => "trend-flat",
        }
    }
}

/// A percent change rendered as `"▲ 12.5%"` / `"▼ 3.0%"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Variation {
    pub trend: Trend,
    pub text: String,
}

/// Build the arrow-and-percent badge shown under a KPI.
///
/// ```
/// use stories_core::formatting::{format_variation, Trend};
///
/// let v = format_variation(Some(12.54));
/// assert_eq!(v.text, "▲ 12.5%");
/// assert_eq!(v.trend, Trend::Up);
/// assert_eq!(format_variation(Some(-3.0)).text, "▼ 3.0%");
/// ```
pub fn format_variation(change_pct: Option<f64>) -> Variation {
    match change_pct {
        Some(pct) if pct >= 0.0 => Variation {
            trend: Trend::Up,
            text: format!("▲ {}%", format_number(pct, 1)),
        },
        Some(pct) => Variation {
            trend: Trend::Down,
            text: format!("▼ {}%", format_number(pct.abs(), 1)),
        },
        None => Variation {
            trend: Trend::Flat,
            text: MISSING.to_string(),
        },
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert a comma before every group of three digits counted from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
