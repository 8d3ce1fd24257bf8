//! Summarizer client
//!
//! Builds the prompt from extracted text and options, makes exactly one call
//! to the configured text-generation service and cleans up its answer.
//! Nothing is retried: failures are typed and returned to the caller.

pub mod options;
pub mod prompt;

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::llm::LLM;
use crate::models::SummaryRequest;
use crate::types::{LLMError, LLMMessage, LLMRequest};
use crate::utils::truncate_chars;

pub use options::{SummaryOptions, SummaryTask, LANGUAGES};

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("The document contains no extractable text")]
    EmptyInput,

    #[error("Summarization service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Summarization quota exceeded: {0}")]
    QuotaExceeded(String),
}

impl From<LLMError> for SummarizeError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::QuotaExceeded(message) => SummarizeError::QuotaExceeded(message),
            other => SummarizeError::ServiceUnavailable(other.to_string()),
        }
    }
}

pub struct SummarizerService {
    llm: Option<Arc<LLM>>,
    max_source_chars: usize,
}

impl SummarizerService {
    /// `llm` is `None` in offline mode.
    pub fn new(llm: Option<Arc<LLM>>, config: &Config) -> Self {
        Self {
            llm,
            max_source_chars: config.summary.max_source_chars,
        }
    }

    pub fn is_online(&self) -> bool {
        self.llm.is_some()
    }

    /// Whether `text` will be cut before it is sent to the model.
    pub fn exceeds_source_budget(&self, text: &str) -> bool {
        truncate_chars(text, self.max_source_chars).1
    }

    pub async fn summarize(&self, request: &SummaryRequest) -> Result<String, SummarizeError> {
        if request.text.trim().is_empty() {
            return Err(SummarizeError::EmptyInput);
        }

        let options = &request.options;
        let Some(llm) = self.llm.as_ref() else {
            warn!("No LLM configured, returning offline scaffold");
            return Ok(prompt::offline_scaffold(options));
        };

        let (sources, truncated) = truncate_chars(&request.text, self.max_source_chars);
        if truncated {
            warn!(
                limit = self.max_source_chars,
                "Source text exceeds the prompt budget and was truncated"
            );
        }

        let llm_request = LLMRequest {
            model: llm.model().to_string(),
            messages: vec![
                LLMMessage::system(prompt::SYSTEM_PROMPT),
                LLMMessage::user(prompt::build_user_prompt(sources, options)),
            ],
            max_tokens: None,
            temperature: Some(llm.temperature()),
        };

        info!(
            provider = llm.provider_name(),
            model = llm.model(),
            task = options.task.as_str(),
            words = options.words,
            language = %options.language,
            source_chars = sources.chars().count(),
            "Requesting summary"
        );

        let response = llm.create_chat_completion(&llm_request).await?;

        info!(
            finish_reason = %response.finish_reason,
            total_tokens = response.usage.total_tokens,
            "Summary generated"
        );

        let summary = prompt::post_process(&response.content);
        if summary.is_empty() {
            warn!("Completion was empty after cleanup");
            return Err(SummarizeError::ServiceUnavailable(
                "completion contained no summary text".to_string(),
            ));
        }
        Ok(summary)
    }
}
