//! Export formatting
//!
//! Renders summary text into a downloadable byte stream. TXT is the text
//! itself; DOCX and PDF are produced with `docx-rs` and `lopdf`.

pub mod docx;
pub mod pdf;

use thiserror::Error;

use crate::types::DocumentFormat;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0:?} (expected pdf, docx or txt)")]
    UnsupportedFormat(String),

    #[error("Failed to render {format}: {reason}")]
    RenderFailed {
        format: DocumentFormat,
        reason: String,
    },
}

impl ExportError {
    pub(crate) fn render_failed(format: DocumentFormat, reason: impl std::fmt::Display) -> Self {
        ExportError::RenderFailed {
            format,
            reason: reason.to_string(),
        }
    }
}

pub fn render(text: &str, format: DocumentFormat) -> Result<Vec<u8>, ExportError> {
    match format {
        DocumentFormat::Txt => Ok(text.as_bytes().to_vec()),
        DocumentFormat::Docx => docx::render(text),
        DocumentFormat::Pdf => pdf::render(text),
    }
}

/// Render for a user-supplied format tag.
pub fn render_tag(text: &str, format_tag: &str) -> Result<(DocumentFormat, Vec<u8>), ExportError> {
    let format = DocumentFormat::from_tag(format_tag)
        .ok_or_else(|| ExportError::UnsupportedFormat(format_tag.to_string()))?;
    Ok((format, render(text, format)?))
}
