//! JSON view and report downloads.

use axum::{
    extract::{RawQuery, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use stories_runtime::dashboard::ExportFormat;
use stories_runtime::view::ViewQuery;

use super::{
    pages::page_response, query::parse_view_query, status_for, ApiError, ApiResponse, AppState,
    ResponseMeta,
};
use crate::middleware::{session_id, RequestId};

/// `GET /api/view`: the filtered dashboard view as JSON.
pub(super) async fn view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    let session = session_id(&headers);
    let result = parse_view_query(raw.as_deref())
        .and_then(|query| state.dashboard.view(session.as_deref(), &query));

    match result {
        Ok(view) => Json(ApiResponse {
            data: view,
            meta: ResponseMeta::new(req_id.0),
        })
        .into_response(),
        Err(e) => ApiError::from_dashboard(req_id.0, &e).into_response(),
    }
}

pub(super) async fn export_html(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    export(&state, &headers, raw.as_deref(), ExportFormat::Html)
}

pub(super) async fn export_xlsx(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(raw): RawQuery,
) -> Response {
    export(&state, &headers, raw.as_deref(), ExportFormat::Xlsx)
}

/// Render the current selection as a download. Failures are shown inline on
/// the page so the visitor can adjust the filter and retry.
fn export(state: &AppState, headers: &HeaderMap, raw: Option<&str>, format: ExportFormat) -> Response {
    let session = session_id(headers);

    let query = match parse_view_query(raw) {
        Ok(query) => query,
        Err(e) => {
            return page_response(state, session.as_deref(), &ViewQuery::default(), "", Some(e))
        }
    };

    match state
        .dashboard
        .export(session.as_deref(), &query, format, state.reports.as_ref())
    {
        Ok(report) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, report.content_type().to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", report.file_name()),
                ),
            ],
            report.bytes,
        )
            .into_response(),
        Err(e) => {
            let status = status_for(e.kind());
            let mut response = page_response(
                state,
                session.as_deref(),
                &query,
                raw.unwrap_or_default(),
                Some(e),
            );
            *response.status_mut() = status;
            response
        }
    }
}
