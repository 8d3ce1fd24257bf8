use axum::{
    extract::{Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Extension, Form, Router,
};
use tracing::info;

use crate::export;
use crate::models::{AppState, DownloadQuery, ExportForm, SummaryResult};
use crate::session::SessionId;
use crate::summarizer::SummaryOptions;
use crate::types::{AppError, AppResult, DocumentFormat};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/download", get(download_latest).post(download_edited))
}

/// Render the session's stored summary.
async fn download_latest(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Query(query): Query<DownloadQuery>,
) -> AppResult<Response> {
    let result = latest_or_not_found(&state, &session).await?;
    let tag = requested_format(query.format, &result.options);
    render_download(result.summary, result.options, tag).await
}

/// Render text edited in the browser, falling back to the stored summary.
async fn download_edited(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Form(form): Form<ExportForm>,
) -> AppResult<Response> {
    let stored = state.sessions.latest(&session).await;
    let edited = form.text.replace("\r\n", "\n");

    let (text, options) = match stored {
        Some(result) if edited.trim().is_empty() => (result.summary, result.options),
        Some(result) => (edited, result.options),
        None if !edited.trim().is_empty() => (edited, SummaryOptions::default()),
        None => return Err(nothing_to_export()),
    };

    let tag = requested_format(form.format, &options);
    render_download(text, options, tag).await
}

async fn latest_or_not_found(state: &AppState, session: &SessionId) -> AppResult<SummaryResult> {
    state.sessions.latest(session).await.ok_or_else(nothing_to_export)
}

fn nothing_to_export() -> AppError {
    AppError::NotFound("No summary to export in this session".to_string())
}

/// Blank or missing format means the one chosen at upload time.
fn requested_format(format: Option<String>, options: &SummaryOptions) -> String {
    format
        .filter(|tag| !tag.trim().is_empty())
        .unwrap_or_else(|| options.output.extension().to_string())
}

async fn render_download(text: String, options: SummaryOptions, tag: String) -> AppResult<Response> {
    let (format, bytes) = tokio::task::spawn_blocking(move || export::render_tag(&text, &tag)).await??;

    let filename = format!("{}.{}", options.base_filename(), format.extension());
    info!(format = %format, bytes = bytes.len(), filename = %filename, "Rendered download");

    let headers = attachment_headers(format, &filename)?;
    Ok((headers, bytes).into_response())
}

fn attachment_headers(format: DocumentFormat, filename: &str) -> AppResult<[(header::HeaderName, HeaderValue); 2]> {
    let content_type = HeaderValue::from_str(&format.content_type())
        .map_err(|e| AppError::Internal(format!("invalid content type: {}", e)))?;
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| AppError::Internal(format!("invalid download name: {}", e)))?;

    Ok([
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_DISPOSITION, disposition),
    ])
}
