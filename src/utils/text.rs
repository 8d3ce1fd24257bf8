// Plain-text helpers shared by extraction and summarization

use regex::Regex;
use std::sync::LazyLock;

static HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize extracted text: NULs become spaces, page breaks become blank
/// lines, at most one blank line is kept between blocks, ends trimmed.
/// Indentation and tabs inside the text are left alone.
pub fn clean_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let text = raw
        .replace('\0', " ")
        .replace("\r\n", "\n")
        .replace('\u{c}', "\n\n");
    let text = collapse_blank_lines(&text);
    text.trim().to_string()
}

/// Collapse runs of spaces and tabs to one space and trim each line. For
/// sources like PDF where spacing is a layout artifact.
pub fn collapse_spaces(text: &str) -> String {
    text.lines()
        .map(|line| HORIZONTAL_SPACE.replace_all(line.trim(), " "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse three or more consecutive newlines down to two.
pub fn collapse_blank_lines(text: &str) -> String {
    EXCESS_NEWLINES.replace_all(text, "\n\n").into_owned()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Cut `text` to at most `max_chars` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
