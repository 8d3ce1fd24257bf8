//! Prompt templates, response clean-up and the offline scaffold.

use regex::Regex;
use std::sync::LazyLock;

use crate::summarizer::options::{SummaryOptions, SummaryTask};
use crate::utils::collapse_blank_lines;

pub const SYSTEM_PROMPT: &str = "You are a careful assistant that strictly uses the provided sources.";

static PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\[?Page\s+\d+\]?\s*").unwrap());
static DASHED_PAGE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*-{2,}\s*Page\s+\d+\s*-{2,}\s*").unwrap());

fn task_intro(task: SummaryTask, language: &str, words: u32) -> String {
    match task {
        SummaryTask::Summary => format!(
            "You are an expert academic summarizer. Write a concise, faithful, and well-structured **summary** \
             of the provided sources in {language}, with a target length of ~{words} words (±10%). \
             Preserve key terms, avoid hallucinations, and do not include content not supported by the sources."
        ),
        SummaryTask::Detailed => format!(
            "You are an expert technical writer. Produce a **detailed, structured report** in {language} \
             based strictly on the provided sources, ~{words} words (±10%). \
             Explain important concepts with brief, precise definitions and include a short executive summary at the top."
        ),
        SummaryTask::StudyNote => format!(
            "Create **exam-ready study notes** in {language}, ~{words} words (±10%), strictly from the sources."
        ),
        SummaryTask::Presentation => format!(
            "Create a **presentation-style outline** in {language}, ~{words} words (±10%), based strictly on the sources."
        ),
    }
}

fn output_rules(task: SummaryTask) -> &'static [&'static str] {
    match task {
        SummaryTask::Summary => &[
            "Use clear headings.",
            "Bullet points where useful.",
            "No page markers. No citations unless explicitly present in the text.",
        ],
        SummaryTask::Detailed => &[
            "Use H2/H3 headings.",
            "Include short executive summary, key insights, and practical recommendations.",
            "Avoid fabrications. No page markers.",
        ],
        SummaryTask::StudyNote => &[
            "Use concise bullet points.",
            "Include formulas or definitions when present.",
            "Add a quick self-check quiz (5 questions) at the end.",
            "No page markers.",
        ],
        SummaryTask::Presentation => &[
            "Structure as slides with titles and 3–6 bullets each.",
            "Start with Agenda. End with Key Takeaways.",
            "Keep bullets crisp; no page markers.",
        ],
    }
}

/// Build the user message for `sources` under `options`.
pub fn build_user_prompt(sources: &str, options: &SummaryOptions) -> String {
    let mut prompt = task_intro(options.task, &options.language, options.words);
    prompt.push_str("\n\n");

    if !options.notes.trim().is_empty() {
        prompt.push_str("== USER NOTES ==\n");
        prompt.push_str(options.notes.trim());
        prompt.push_str("\n\n");
    }

    prompt.push_str("== SOURCES ==\n");
    prompt.push_str(sources);
    prompt.push_str("\n\n== OUTPUT RULES ==\n");
    for rule in output_rules(options.task) {
        prompt.push_str("- ");
        prompt.push_str(rule);
        prompt.push('\n');
    }

    prompt.trim().to_string()
}

/// Strip page markers the model copied from the sources and tidy spacing.
pub fn post_process(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = DASHED_PAGE_MARKER.replace_all(text, " ");
    let text = PAGE_MARKER.replace_all(&text, " ");
    collapse_blank_lines(&text).trim().to_string()
}

/// Deterministic stand-in used when no API key is configured.
pub fn offline_scaffold(options: &SummaryOptions) -> String {
    let heading = match options.task {
        SummaryTask::Summary => "Executive Summary",
        SummaryTask::Detailed => "Detailed Report",
        SummaryTask::StudyNote => "Study Notes",
        SummaryTask::Presentation => "Presentation Outline",
    };

    let mut blocks = vec![format!("# {} ({}, ~{} words)", heading, options.language, options.words)];

    let sections: &[(&str, &str)] = match options.task {
        SummaryTask::Presentation => &[
            ("## Agenda", "- Problem Overview\n- Key Insights\n- Method/Approach\n- Results\n- Limitations\n- Key Takeaways"),
            ("## Slide 1: Problem Overview", "- Brief context\n- Why it matters\n- Scope and objectives"),
            ("## Slide 2: Key Insights", "- Insight 1\n- Insight 2\n- Insight 3"),
            ("## Slide 3: Method/Approach", "- Data used\n- Steps\n- Constraints"),
            ("## Slide 4: Results", "- Result A\n- Result B\n- Result C"),
            ("## Slide 5: Limitations", "- Data quality\n- Assumptions\n- External factors"),
            ("## Key Takeaways", "- Takeaway 1\n- Takeaway 2\n- Takeaway 3"),
        ],
        SummaryTask::StudyNote => &[
            ("## Core Concepts", "- Term 1: short definition\n- Term 2: short definition\n- Term 3: short definition"),
            ("## Key Points", "- Point A\n- Point B\n- Point C"),
            ("## Examples", "- Example 1\n- Example 2"),
            ("## Quick Self-Check (5)", "1) Question 1?\n2) Question 2?\n3) Question 3?\n4) Question 4?\n5) Question 5?"),
        ],
        SummaryTask::Detailed => &[
            ("## Executive Summary", "- High-level overview with main findings."),
            ("## Background", "- Context and definitions."),
            ("## Analysis", "- Evidence-backed points derived from sources."),
            ("## Recommendations", "- Actionable, prioritized steps."),
            ("## Conclusion", "- Final synthesis."),
        ],
        SummaryTask::Summary => &[
            ("## Overview", "- Main idea and scope."),
            ("## Key Insights", "- Insight 1\n- Insight 2\n- Insight 3"),
            ("## Conclusion", "- Short wrap-up."),
        ],
    };

    for (title, body) in sections {
        blocks.push(title.to_string());
        blocks.push(body.to_string());
    }

    post_process(&blocks.join("\n\n"))
}
