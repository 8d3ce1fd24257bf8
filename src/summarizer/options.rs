//! Summary options as submitted by the upload form, and their normalization.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::types::DocumentFormat;

pub const LANGUAGES: &[&str] = &[
    "English", "Polish", "Turkish", "Azerbaijani", "Russian", "German", "French", "Spanish",
    "Italian", "Portuguese", "Ukrainian", "Arabic", "Chinese", "Japanese", "Korean", "Hindi",
];

pub const DEFAULT_WORDS: u32 = 800;
pub const MIN_WORDS: u32 = 50;
pub const MAX_WORDS: u32 = 20_000;
pub const DEFAULT_LANGUAGE: &str = "English";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w]+").unwrap());

/// Kind of document the model is asked to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryTask {
    #[default]
    #[serde(rename = "summary")]
    Summary,
    #[serde(rename = "detailed")]
    Detailed,
    #[serde(rename = "study note")]
    StudyNote,
    #[serde(rename = "presentation")]
    Presentation,
}

impl SummaryTask {
    pub const ALL: [SummaryTask; 4] = [
        SummaryTask::Summary,
        SummaryTask::Detailed,
        SummaryTask::StudyNote,
        SummaryTask::Presentation,
    ];

    /// Resolve user input and its aliases; unknown values fall back to a plain summary.
    pub fn from_alias(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "detailed" | "report" => SummaryTask::Detailed,
            "study note" | "studynote" | "notes" => SummaryTask::StudyNote,
            "presentation" | "slides" => SummaryTask::Presentation,
            _ => SummaryTask::Summary,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryTask::Summary => "summary",
            SummaryTask::Detailed => "detailed",
            SummaryTask::StudyNote => "study note",
            SummaryTask::Presentation => "presentation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SummaryTask::Summary => "Summary",
            SummaryTask::Detailed => "Detailed report",
            SummaryTask::StudyNote => "Study notes",
            SummaryTask::Presentation => "Presentation outline",
        }
    }

    /// Filename token, e.g. `StudyNote`.
    fn file_token(&self) -> &'static str {
        match self {
            SummaryTask::Summary => "Summary",
            SummaryTask::Detailed => "Detailed",
            SummaryTask::StudyNote => "StudyNote",
            SummaryTask::Presentation => "Presentation",
        }
    }
}

/// Normalized options. Construct with [`SummaryOptions::normalized`] so every
/// field is within its allowed range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryOptions {
    pub task: SummaryTask,
    pub words: u32,
    pub language: String,
    #[serde(default)]
    pub notes: String,
    pub output: DocumentFormat,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            task: SummaryTask::Summary,
            words: DEFAULT_WORDS,
            language: DEFAULT_LANGUAGE.to_string(),
            notes: String::new(),
            output: DocumentFormat::Txt,
        }
    }
}

impl SummaryOptions {
    pub fn normalized(task: &str, words: &str, language: &str, notes: &str, output: &str) -> Self {
        Self {
            task: SummaryTask::from_alias(task),
            words: clamp_words(words),
            language: normalize_language(language),
            notes: notes.trim().to_string(),
            output: DocumentFormat::from_tag(output).unwrap_or(DocumentFormat::Txt),
        }
    }

    /// Base download name, e.g. `Presentation_1500w_Polish`.
    pub fn base_filename(&self) -> String {
        let language = NON_WORD.replace_all(self.language.trim(), "");
        let language: &str = if language.is_empty() { DEFAULT_LANGUAGE } else { &language };
        format!("{}_{}w_{}", self.task.file_token(), self.words, language)
    }
}

/// Parse and clamp the requested word count; unparsable input yields the default.
pub fn clamp_words(raw: &str) -> u32 {
    let requested = raw.trim().parse::<i64>().unwrap_or(DEFAULT_WORDS as i64);
    requested.clamp(MIN_WORDS as i64, MAX_WORDS as i64) as u32
}

/// Exact match first, then capitalized (`polish` → `Polish`), else English.
pub fn normalize_language(raw: &str) -> String {
    let lang = raw.trim();
    if LANGUAGES.contains(&lang) {
        return lang.to_string();
    }

    let mut chars = lang.chars();
    let capitalized: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    if LANGUAGES.contains(&capitalized.as_str()) {
        capitalized
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}
