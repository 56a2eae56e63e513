//! The HTML page and the upload form handler.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use stories_core::{DashboardError, ErrorKind};
use stories_runtime::dashboard::Upload;
use stories_runtime::view::ViewQuery;
use stories_ui::page::{render_page, PageContext};
use tracing::{debug, warn};

use super::{query::parse_view_query, status_for, AppState};
use crate::middleware::{session_cookie, session_id};

/// Render the dashboard page for `session`, with `error` shown inline.
///
/// A filter that matches nothing is reported inline while the filter form
/// keeps offering the unfiltered choices.
pub(super) fn page_response(
    state: &AppState,
    session: Option<&str>,
    query: &ViewQuery,
    query_string: &str,
    error: Option<DashboardError>,
) -> Response {
    let mut error = error;
    let mut view = None;
    let mut choices = None;

    if state.dashboard.has_data(session) {
        match state.dashboard.view(session, query) {
            Ok(v) => view = Some(v),
            Err(e) => {
                let unfiltered = ViewQuery {
                    granularity: query.granularity,
                    ..ViewQuery::default()
                };
                choices = state.dashboard.view(session, &unfiltered).ok();
                error.get_or_insert(e);
            }
        }
    }

    let status = match error.as_ref().map(DashboardError::kind) {
        None | Some(ErrorKind::NoData) => StatusCode::OK,
        Some(kind) => status_for(kind),
    };

    let markup = render_page(&PageContext {
        theme: state.reports.theme(),
        max_upload_mb: state.max_upload_mb,
        error: error.as_ref(),
        view: view.as_ref(),
        choices: choices.as_ref().or(view.as_ref()),
        query,
        query_string,
    });
    (status, Html(markup.into_string())).into_response()
}

pub(super) async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let session = session_id(&headers);
    match parse_view_query(raw.as_deref()) {
        Ok(query) => page_response(
            &state,
            session.as_deref(),
            &query,
            raw.as_deref().unwrap_or_default(),
            None,
        ),
        Err(e) => page_response(&state, session.as_deref(), &ViewQuery::default(), "", Some(e)),
    }
}

// ── Upload ────────────────────────────────────────────────────────────────────

struct UploadedFile {
    file_name: String,
    bytes: Bytes,
}

impl UploadedFile {
    fn as_upload(&self) -> Upload<'_> {
        Upload {
            file_name: &self.file_name,
            bytes: &self.bytes,
        }
    }
}

fn multipart_error(err: &MultipartError, max_upload_mb: u64) -> DashboardError {
    let message = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!("the upload exceeds the {max_upload_mb} MB limit")
    } else {
        err.body_text()
    };
    DashboardError::FileFormat {
        file: "uploaded".to_string(),
        message,
    }
}

fn missing_file(field: &str) -> DashboardError {
    DashboardError::FileFormat {
        file: field.to_string(),
        message: "no file was uploaded".to_string(),
    }
}

/// Collect the `current` and `prior` file parts; other fields are ignored.
async fn read_uploads(
    mut multipart: Multipart,
    max_upload_mb: u64,
) -> Result<(UploadedFile, UploadedFile), DashboardError> {
    let mut current = None;
    let mut prior = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_upload_mb))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let slot = match name.as_str() {
            "current" => &mut current,
            "prior" => &mut prior,
            _ => continue,
        };
        let file_name = field
            .file_name()
            .filter(|n| !n.is_empty())
            .map_or_else(|| format!("{name}.csv"), String::from);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e, max_upload_mb))?;
        debug!(field = %name, file = %file_name, bytes = bytes.len(), "upload part received");
        *slot = Some(UploadedFile { file_name, bytes });
    }

    let current = current.ok_or_else(|| missing_file("current-year"))?;
    let prior = prior.ok_or_else(|| missing_file("prior-year"))?;
    Ok((current, prior))
}

/// Replace the session's data with the two uploaded files.
///
/// On success the browser is redirected back to the page; on failure the
/// page is rendered with the error and any earlier data left in place.
pub(super) async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let session = session_id(&headers).filter(|id| state.dashboard.has_data(Some(id)));

    let result = read_uploads(multipart, state.max_upload_mb)
        .await
        .and_then(|(current, prior)| {
            state
                .dashboard
                .upload(session.as_deref(), current.as_upload(), prior.as_upload())
        });

    match result {
        Ok(id) => (
            [(header::SET_COOKIE, session_cookie(&id))],
            Redirect::to("/"),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "upload failed");
            page_response(&state, session.as_deref(), &ViewQuery::default(), "", Some(e))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
