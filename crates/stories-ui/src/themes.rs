//! Colour themes shared by the dashboard page, the charts and the HTML report.

/// Complete theme definition carrying every colour used by the UI.
///
/// Colours are CSS strings so they can be fed to both the stylesheet and
/// plotly layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,

    // ── Page ─────────────────────────────────────────────────────────────────
    pub background: &'static str,
    pub surface: &'static str,
    pub border: &'static str,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,

    // ── Status ───────────────────────────────────────────────────────────────
    /// Upward variation.
    pub success: &'static str,
    /// Downward variation and error banners.
    pub error: &'static str,
    pub error_background: &'static str,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: &'static str,
    pub table_row_alt: &'static str,
    pub table_total: &'static str,

    // ── Charts ───────────────────────────────────────────────────────────────
    /// Series colour for the current year.
    pub current_series: &'static str,
    /// Series colour for the prior year.
    pub prior_series: &'static str,
    /// Cycled for per-brand line series.
    pub palette: &'static [&'static str],
}

const PALETTE: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Light theme (default).
    pub fn light() -> Self {
        Self {
            name: "light",
            background: "#f5f6fa",
            surface: "#ffffff",
            border: "#dcdde1",
            text: "#2f3640",
            muted: "#718093",
            accent: "#6c5ce7",
            success: "#2e7d32",
            error: "#c62828",
            error_background: "#fdecea",
            table_header: "#eceff4",
            table_row_alt: "#f8f9fb",
            table_total: "#fff4d6",
            current_series: "#6c5ce7",
            prior_series: "#b2bec3",
            palette: PALETTE,
        }
    }

    /// Dark theme.
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: "#1e1f26",
            surface: "#2a2b36",
            border: "#3d3f4e",
            text: "#e8e8f0",
            muted: "#a0a3b8",
            accent: "#a29bfe",
            success: "#66bb6a",
            error: "#ef5350",
            error_background: "#3b2224",
            table_header: "#33354a",
            table_row_alt: "#262733",
            table_total: "#4a4226",
            current_series: "#a29bfe",
            prior_series: "#636e72",
            palette: PALETTE,
        }
    }

    /// Construct a theme by name. Unknown names fall back to the light theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "dark" => Self::dark(),
            _ => Self::light(),
        }
    }

    /// Colour of the `index`-th series, cycling through the palette.
    pub fn series_color(&self, index: usize) -> &'static str {
        self.palette[index % self.palette.len()]
    }

    /// Stylesheet embedded in the dashboard page and the HTML report.
    pub fn css(&self) -> String {
        format!(
            r#"
:root {{ color-scheme: {name}; }}
body {{ margin: 0; padding: 0 2rem 2rem; font-family: system-ui, -apple-system, "Segoe UI", sans-serif; background: {background}; color: {text}; }}
h1, h2, h3 {{ font-weight: 600; }}
a {{ color: {accent}; }}
.muted {{ color: {muted}; font-size: 0.9rem; }}
.panel {{ background: {surface}; border: 1px solid {border}; border-radius: 8px; padding: 1rem 1.25rem; margin: 1rem 0; }}
.banner-error {{ background: {error_background}; color: {error}; border: 1px solid {error}; border-radius: 6px; padding: 0.75rem 1rem; margin: 1rem 0; }}
.kpi-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(190px, 1fr)); gap: 0.75rem; }}
.kpi-card {{ background: {surface}; border: 1px solid {border}; border-radius: 8px; padding: 0.75rem 1rem; }}
.kpi-title {{ color: {muted}; font-size: 0.85rem; }}
.kpi-value {{ font-size: 1.5rem; font-weight: 600; margin: 0.25rem 0; }}
.kpi-caption {{ color: {muted}; font-size: 0.8rem; }}
.trend-up {{ color: {success}; font-weight: 600; }}
.trend-down {{ color: {error}; font-weight: 600; }}
.trend-flat {{ color: {muted}; }}
table.data {{ border-collapse: collapse; width: 100%; font-size: 0.9rem; background: {surface}; }}
table.data th, table.data td {{ border: 1px solid {border}; padding: 0.35rem 0.6rem; text-align: right; }}
table.data th {{ background: {table_header}; }}
table.data td.label {{ text-align: left; }}
table.data tbody tr:nth-child(even) {{ background: {table_row_alt}; }}
table.data tr.total {{ background: {table_total}; font-weight: 600; }}
.tabs > input[type=radio] {{ display: none; }}
.tabs > label {{ display: inline-block; padding: 0.5rem 1rem; border: 1px solid {border}; border-bottom: none; border-radius: 6px 6px 0 0; cursor: pointer; color: {muted}; background: {background}; }}
.tabs > input[type=radio]:checked + label {{ background: {surface}; color: {text}; font-weight: 600; }}
.tab-panel {{ display: none; border-top: 1px solid {border}; }}
#tab-data:checked ~ .panel-data, #tab-charts:checked ~ .panel-charts, #tab-reports:checked ~ .panel-reports {{ display: block; }}
.filters {{ display: flex; flex-wrap: wrap; gap: 1.5rem; align-items: flex-start; }}
.filters fieldset {{ border: 1px solid {border}; border-radius: 6px; }}
.chart {{ margin: 1rem 0; }}
button, .button {{ background: {accent}; color: #fff; border: none; border-radius: 6px; padding: 0.5rem 1rem; cursor: pointer; text-decoration: none; display: inline-block; }}
"#,
            name = self.name,
            background = self.background,
            surface = self.surface,
            border = self.border,
            text = self.text,
            muted = self.muted,
            accent = self.accent,
            success = self.success,
            error = self.error,
            error_background = self.error_background,
            table_header = self.table_header,
            table_row_alt = self.table_row_alt,
            table_total = self.table_total,
        )
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
