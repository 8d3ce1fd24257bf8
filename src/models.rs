use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::llm::LLM;
use crate::middleware::GenerateLimiter;
use crate::session::SessionStore;
use crate::summarizer::{SummarizerService, SummaryOptions};
use crate::types::DocumentFormat;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub summarizer: Arc<SummarizerService>,
    pub limiter: GenerateLimiter,
}

impl AppState {
    /// Wire the pipeline from configuration. Without an API key the
    /// summarizer runs in offline mode.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let llm = match config.llm.active_api_key() {
            Some(_) => Some(Arc::new(LLM::from_config(&config.llm)?)),
            None => {
                tracing::warn!("No LLM API key configured, summaries will be offline scaffolds");
                None
            }
        };

        Ok(Self {
            sessions: SessionStore::new(std::time::Duration::from_secs(config.session.ttl_secs)),
            summarizer: Arc::new(SummarizerService::new(llm, &config)),
            limiter: GenerateLimiter::new(config.summary.generate_per_minute),
            config,
        })
    }
}

/// A file as received from the upload form. Dropped once text is extracted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    /// Format tag as declared by the client (extension or MIME type).
    pub declared_type: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    /// Build from a multipart part, declaring the type from the filename's
    /// extension and falling back to the part's content type.
    pub fn from_part(filename: Option<&str>, content_type: Option<&str>, bytes: Bytes) -> Self {
        let filename = filename
            .map(|name| name.rsplit(['/', '\\']).next().unwrap_or(name).trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "document".to_string());

        let extension = std::path::Path::new(&filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let declared_type = match extension {
            Some(ext) => ext,
            None => content_type
                .and_then(DocumentFormat::from_mime)
                .map(|format| format.extension().to_string())
                .or_else(|| content_type.map(str::to_string))
                .unwrap_or_default(),
        };

        Self {
            filename,
            declared_type,
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExtractionMetadata {
    pub format: DocumentFormat,
    pub byte_size: usize,
    /// Pages for PDF and plain text (form-feed separated), non-empty paragraphs for DOCX.
    pub page_count: usize,
    pub char_count: usize,
    pub word_count: usize,
    /// Set when the text was cut to fit the prompt budget.
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub metadata: ExtractionMetadata,
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub text: String,
    pub options: SummaryOptions,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub source_filename: String,
    pub generated_at: DateTime<Utc>,
    pub options: SummaryOptions,
    pub metadata: ExtractionMetadata,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    /// "online" when an API key is configured, "offline" otherwise.
    pub llm: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct DownloadQuery {
    pub format: Option<String>,
}

/// Export form posted from the result editor.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct ExportForm {
    pub format: Option<String>,
    #[serde(default)]
    pub text: String,
}
