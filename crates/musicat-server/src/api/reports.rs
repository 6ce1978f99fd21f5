//! Report download and summary endpoints.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::middleware::AuthUser;
use musicat_db::AppState;
use musicat_report::{generate_report, render, ReportBundle, ReportError, ReportFormat, SystemClock};

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub format: Option<String>,
}

/// Where a failed download sends the browser, with the message to show.
pub fn error_redirect(report_page: &str, err: &ReportError) -> Redirect {
    let message = err.user_message();
    let separator = if report_page.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{report_page}{separator}error={}",
        urlencoding::encode(&message)
    ))
}

/// GET /api/admin/report?format=spreadsheet|paginated-document
pub async fn download_report(
    State(state): State<Arc<AppState>>,
    axum::Extension(auth_user): axum::Extension<AuthUser>,
    Query(params): Query<ReportParams>,
) -> Response {
    match build_report(&state, params.format.as_deref()).await {
        Ok(response) => {
            tracing::info!(user_id = %auth_user.0.sub, "report downloaded");
            response
        }
        Err(err) => {
            tracing::warn!(user_id = %auth_user.0.sub, error = %err, "report generation failed");
            // 303 so the browser follows with a GET
            error_redirect(&state.report_page, &err).into_response()
        }
    }
}

async fn build_report(state: &AppState, format: Option<&str>) -> Result<Response, ReportError> {
    let started = Instant::now();

    // Reject bad or unbuildable formats before touching the database.
    let format: ReportFormat = match format {
        Some(raw) => raw.parse()?,
        None => ReportFormat::default(),
    };
    format.ensure_available()?;

    let bundle = generate_report(&state.db, &SystemClock).await?;
    let sections = bundle.section_sizes();

    let rendered = tokio::task::spawn_blocking(move || render(&bundle, format))
        .await
        .map_err(|e| match format {
            ReportFormat::Spreadsheet => ReportError::Spreadsheet(e.to_string()),
            ReportFormat::PaginatedDocument => ReportError::Document(e.to_string()),
        })??;

    tracing::info!(
        report.format = %format,
        sections = ?sections,
        bytes = rendered.bytes.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "report generated"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(rendered.content_type()),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            rendered.filename()
        ))
        .map_err(|e| ReportError::Document(e.to_string()))?,
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((StatusCode::OK, headers, rendered.bytes).into_response())
}

/// GET /api/admin/report/summary
pub async fn report_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReportBundle>, (StatusCode, String)> {
    generate_report(&state.db, &SystemClock)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "report summary failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.user_message())
        })
}
