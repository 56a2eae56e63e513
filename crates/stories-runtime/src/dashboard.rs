//! Dashboard orchestrator.
//!
//! Coordinates ingestion, the [`SessionStore`] and view building. Report
//! rendering lives in the UI layer and is reached through [`ReportExporter`].

use chrono::Utc;
use stories_core::brands::BrandResolver;
use stories_core::models::AnalysisOptions;
use stories_core::{DashboardError, Result};
use stories_data::reader::read_pair;
use tracing::{info, warn};

use crate::session::{DashboardSession, SessionStore};
use crate::view::{DashboardView, ViewQuery};

// ── Public types ──────────────────────────────────────────────────────────────

/// One uploaded file as received from the client.
#[derive(Debug, Clone, Copy)]
pub struct Upload<'a> {
    pub file_name: &'a str,
    pub bytes: &'a [u8],
}

/// Downloadable report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Xlsx,
}

impl ExportFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Html => "stories_report.html",
            ExportFormat::Xlsx => "stories_report.xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Html => "text/html; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

/// A rendered report ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportedReport {
    pub fn file_name(&self) -> &'static str {
        self.format.file_name()
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Renders a [`DashboardView`] into a downloadable document.
pub trait ReportExporter {
    fn render_html(&self, view: &DashboardView) -> Result<String>;
    fn render_xlsx(&self, view: &DashboardView) -> Result<Vec<u8>>;
}

// ── Dashboard ─────────────────────────────────────────────────────────────────

/// Entry point for every visitor action. Each call recomputes from the
/// session's stored tables.
#[derive(Debug)]
pub struct Dashboard {
    store: SessionStore,
    brands: BrandResolver,
    defaults: AnalysisOptions,
}

impl Dashboard {
    pub fn new(defaults: AnalysisOptions, brands: BrandResolver) -> Self {
        Self {
            store: SessionStore::default(),
            brands,
            defaults,
        }
    }

    /// Number of sessions currently holding data.
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    /// `true` when `session_id` names a session holding both uploads.
    pub fn has_data(&self, session_id: Option<&str>) -> bool {
        session_id.and_then(|id| self.store.get(id)).is_some()
    }

    /// Validate both uploads and replace the session's data wholesale.
    ///
    /// A rejected upload leaves any previous session data untouched. Returns
    /// the session id, which is newly generated when `session_id` is `None`.
    pub fn upload(
        &self,
        session_id: Option<&str>,
        current: Upload<'_>,
        prior: Upload<'_>,
    ) -> Result<String> {
        let (current_ds, prior_ds) = read_pair(
            (current.file_name, current.bytes),
            (prior.file_name, prior.bytes),
            &self.brands,
        )
        .inspect_err(|e| warn!(error = %e, "upload rejected"))?;

        let id = session_id
            .map(String::from)
            .unwrap_or_else(SessionStore::new_id);
        info!(
            session = %id,
            current_rows = current_ds.rows.len(),
            prior_rows = prior_ds.rows.len(),
            "upload accepted"
        );
        self.store.replace(DashboardSession {
            id: id.clone(),
            current: current_ds,
            prior: prior_ds,
            options: self.defaults,
            uploaded_at: Utc::now(),
        });
        Ok(id)
    }

    /// Build the filtered view for a session.
    pub fn view(&self, session_id: Option<&str>, query: &ViewQuery) -> Result<DashboardView> {
        let session = session_id
            .and_then(|id| self.store.get(id))
            .ok_or_else(|| {
                DashboardError::NoData(
                    "upload the current-year and prior-year files first".to_string(),
                )
            })?;
        DashboardView::build(&session, query)
    }

    /// Build the view and render it in `format`.
    pub fn export(
        &self,
        session_id: Option<&str>,
        query: &ViewQuery,
        format: ExportFormat,
        exporter: &dyn ReportExporter,
    ) -> Result<ExportedReport> {
        let view = self.view(session_id, query)?;
        let bytes = match format {
            ExportFormat::Html => exporter.render_html(&view)?.into_bytes(),
            ExportFormat::Xlsx => exporter.render_xlsx(&view)?,
        };
        info!(format = ?format, bytes = bytes.len(), "report exported");
        Ok(ExportedReport { format, bytes })
    }

    /// Shorthand for [`Dashboard::export`] with [`ExportFormat::Html`].
    pub fn export_html(
        &self,
        session_id: Option<&str>,
        query: &ViewQuery,
        exporter: &dyn ReportExporter,
    ) -> Result<ExportedReport> {
        self.export(session_id, query, ExportFormat::Html, exporter)
    }

    /// Shorthand for [`Dashboard::export`] with [`ExportFormat::Xlsx`].
    pub fn export_xlsx(
        &self,
        session_id: Option<&str>,
        query: &ViewQuery,
        exporter: &dyn ReportExporter,
    ) -> Result<ExportedReport> {
        self.export(session_id, query, ExportFormat::Xlsx, exporter)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
