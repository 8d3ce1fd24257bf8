use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use tracing::{debug, info};

use crate::extract::Extractor;
use crate::middleware::rate_limiter_middleware;
use crate::models::{AppState, SummaryRequest, SummaryResult, UploadedDocument};
use crate::session::SessionId;
use crate::summarizer::SummaryOptions;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router<AppState> {
    let generate = Router::new()
        .route("/api/summarize", post(summarize_document))
        .route_layer(middleware::from_fn_with_state(state, rate_limiter_middleware));

    Router::new()
        .merge(generate)
        .route("/api/summary", get(latest_summary))
        .route("/api/reset", post(reset_session))
}

/// Raw upload form; options are normalized only once the whole body is read.
#[derive(Default)]
struct SummarizeForm {
    document: Option<UploadedDocument>,
    words: String,
    language: String,
    task: String,
    notes: String,
    format: String,
}

impl SummarizeForm {
    fn options(&self) -> SummaryOptions {
        SummaryOptions::normalized(&self.task, &self.words, &self.language, &self.notes, &self.format)
    }
}

async fn read_form(mut multipart: Multipart) -> AppResult<SummarizeForm> {
    let mut form = SummarizeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" | "document" => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(malformed)?;

                // Browsers send an empty, unnamed part when no file was chosen.
                let nothing_chosen = bytes.is_empty() && filename.as_deref().map_or(true, str::is_empty);
                if form.document.is_none() && !nothing_chosen {
                    form.document = Some(UploadedDocument::from_part(
                        filename.as_deref(),
                        content_type.as_deref(),
                        bytes,
                    ));
                }
            }
            "words" => form.words = field.text().await.map_err(malformed)?,
            "language" => form.language = field.text().await.map_err(malformed)?,
            "task" => form.task = field.text().await.map_err(malformed)?,
            "notes" => form.notes = field.text().await.map_err(malformed)?,
            "format" => form.format = field.text().await.map_err(malformed)?,
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Body-limit rejections surface through the multipart stream; keep their 413.
fn malformed(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::InvalidRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

async fn summarize_document(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    multipart: Multipart,
) -> AppResult<Json<SummaryResult>> {
    let form = read_form(multipart).await?;
    let options = form.options();
    let document = form
        .document
        .ok_or_else(|| AppError::InvalidRequest("No document uploaded (expected a `file` field)".to_string()))?;

    info!(
        filename = %document.filename,
        declared_type = %document.declared_type,
        bytes = document.size(),
        task = options.task.as_str(),
        words = options.words,
        language = %options.language,
        "Summarize request received"
    );

    let source_filename = document.filename.clone();
    let extracted = tokio::task::spawn_blocking(move || Extractor::extract_document(&document)).await??;

    let mut metadata = extracted.metadata;
    metadata.truncated = state.summarizer.exceeds_source_budget(&extracted.text);

    let request = SummaryRequest {
        text: extracted.text,
        options,
    };
    let summary = state.summarizer.summarize(&request).await?;

    let result = SummaryResult {
        summary,
        source_filename,
        generated_at: Utc::now(),
        options: request.options,
        metadata,
    };
    state.sessions.put_result(&session, result.clone()).await;

    info!(summary_words = crate::utils::word_count(&result.summary), "Summary stored in session");
    Ok(Json(result))
}

async fn latest_summary(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> AppResult<Json<SummaryResult>> {
    state
        .sessions
        .latest(&session)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No summary in this session yet".to_string()))
}

async fn reset_session(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<serde_json::Value> {
    let cleared = state.sessions.clear(&session).await;
    info!(cleared, "Session reset");

    Json(serde_json::json!({
        "status": "ok",
        "cleared": cleared,
    }))
}
