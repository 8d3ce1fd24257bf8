// PDF parsing via lopdf

use lopdf::Document;
use tracing::warn;

use crate::extract::{ExtractError, ParsedDocument};
use crate::types::DocumentFormat;
use crate::utils::collapse_spaces;

pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let document = Document::load_mem(bytes)
        .map_err(|e| ExtractError::corrupt(DocumentFormat::Pdf, e))?;

    if document.is_encrypted() {
        return Err(ExtractError::corrupt(DocumentFormat::Pdf, "document is encrypted"));
    }

    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(ExtractError::corrupt(DocumentFormat::Pdf, "document has no pages"));
    }

    // A page that fails to decode contributes nothing rather than failing the upload.
    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(text) => texts.push(text),
            Err(e) => {
                warn!(page = page_number, error = %e, "Skipping unreadable PDF page");
                texts.push(String::new());
            }
        }
    }

    Ok(ParsedDocument {
        text: collapse_spaces(&texts.join("\n")),
        page_count: pages.len(),
    })
}
