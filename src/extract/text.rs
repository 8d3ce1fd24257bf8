// Plain-text parsing

use crate::extract::{ExtractError, ParsedDocument};
use crate::types::DocumentFormat;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const FORM_FEED: char = '\u{c}';

pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Text {
            return Err(ExtractError::corrupt(
                DocumentFormat::Txt,
                format!("content looks like {} rather than plain text", kind.mime_type()),
            ));
        }
    }

    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ExtractError::corrupt(DocumentFormat::Txt, format!("not valid UTF-8: {}", e)))?;

    Ok(ParsedDocument {
        text: text.to_string(),
        page_count: page_count(text),
    })
}

/// Pages are separated by form feeds; trailing empty pages are not counted.
fn page_count(text: &str) -> usize {
    text.trim_end_matches(|c: char| c == FORM_FEED || c.is_whitespace())
        .split(FORM_FEED)
        .count()
        .max(1)
}
