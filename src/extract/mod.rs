//! Document extraction
//!
//! Turns an uploaded byte buffer into cleaned plain text plus metadata.
//! Parsing itself is delegated to `lopdf` (PDF) and `docx-rs` (DOCX);
//! plain text is sniffed with `infer` so a binary container declared as
//! `.txt` is rejected instead of being summarized as noise.

pub mod docx;
pub mod pdf;
pub mod text;

use thiserror::Error;
use tracing::debug;

use crate::models::{ExtractedText, ExtractionMetadata, UploadedDocument};
use crate::types::DocumentFormat;
use crate::utils::{clean_text, word_count};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported document format: {0:?} (expected pdf, docx or txt)")]
    UnsupportedFormat(String),

    #[error("Could not read {format} document: {reason}")]
    CorruptDocument {
        format: DocumentFormat,
        reason: String,
    },
}

impl ExtractError {
    pub(crate) fn corrupt(format: DocumentFormat, reason: impl std::fmt::Display) -> Self {
        ExtractError::CorruptDocument {
            format,
            reason: reason.to_string(),
        }
    }
}

/// Raw output of a format parser before cleaning.
pub(crate) struct ParsedDocument {
    pub text: String,
    pub page_count: usize,
}

pub struct Extractor;

impl Extractor {
    /// Extract text from `bytes` declared as `format_tag` (`pdf`, `docx` or `txt`).
    pub fn extract(bytes: &[u8], format_tag: &str) -> Result<ExtractedText, ExtractError> {
        let format = DocumentFormat::from_tag(format_tag)
            .ok_or_else(|| ExtractError::UnsupportedFormat(format_tag.to_string()))?;

        let parsed = match format {
            DocumentFormat::Pdf => pdf::parse(bytes)?,
            DocumentFormat::Docx => docx::parse(bytes)?,
            DocumentFormat::Txt => text::parse(bytes)?,
        };

        let text = clean_text(&parsed.text);
        let metadata = ExtractionMetadata {
            format,
            byte_size: bytes.len(),
            page_count: parsed.page_count,
            char_count: text.chars().count(),
            word_count: word_count(&text),
            truncated: false,
        };

        debug!(
            format = %format,
            bytes = metadata.byte_size,
            pages = metadata.page_count,
            chars = metadata.char_count,
            "Extracted document text"
        );

        Ok(ExtractedText { text, metadata })
    }

    pub fn extract_document(document: &UploadedDocument) -> Result<ExtractedText, ExtractError> {
        Self::extract(&document.bytes, &document.declared_type)
    }
}
