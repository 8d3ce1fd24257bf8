// Type definitions and enums

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::export::ExportError;
use crate::extract::ExtractError;
use crate::summarizer::SummarizeError;

/// Document formats accepted for upload and produced for download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 3] = [DocumentFormat::Pdf, DocumentFormat::Docx, DocumentFormat::Txt];

    /// Parse a format tag such as `"pdf"`, `".DOCX"` or `"txt"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            "txt" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    /// Map a declared MIME type onto a format, ignoring parameters like `charset`.
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let parsed: mime::Mime = content_type.parse().ok()?;
        match parsed.essence_str() {
            "application/pdf" => Some(DocumentFormat::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(DocumentFormat::Docx)
            }
            "text/plain" => Some(DocumentFormat::Txt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Txt => "txt",
        }
    }

    /// Content type used for downloads.
    pub fn content_type(&self) -> String {
        match self {
            DocumentFormat::Txt => "text/plain; charset=utf-8".to_string(),
            other => mime_guess::from_ext(other.extension())
                .first_or_octet_stream()
                .to_string(),
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Failures talking to the external text-generation service.
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("LLM service unreachable: {0}")]
    Unavailable(String),

    #[error("LLM quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed LLM response: {0}")]
    InvalidResponse(String),
}

pub type LLMResult<T> = std::result::Result<T, LLMError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Too many requests, try again in a minute")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Extract(ExtractError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Extract(ExtractError::CorruptDocument { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Summarize(SummarizeError::EmptyInput) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Summarize(SummarizeError::QuotaExceeded(_)) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Summarize(SummarizeError::ServiceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Export(ExportError::UnsupportedFormat(_)) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Export(ExportError::RenderFailed { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code rendered next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Extract(ExtractError::UnsupportedFormat(_))
            | AppError::Export(ExportError::UnsupportedFormat(_)) => "unsupported_format",
            AppError::Extract(ExtractError::CorruptDocument { .. }) => "corrupt_document",
            AppError::Summarize(SummarizeError::EmptyInput) => "empty_input",
            AppError::Summarize(SummarizeError::QuotaExceeded(_)) => "quota_exceeded",
            AppError::Summarize(SummarizeError::ServiceUnavailable(_)) => "service_unavailable",
            AppError::Export(ExportError::RenderFailed { .. }) => "render_failed",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidRequest(_) => "invalid_request",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::RateLimited => "rate_limited",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = serde_json::json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Background task failed: {}", err))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
