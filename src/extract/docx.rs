// DOCX parsing via docx-rs

use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

use crate::extract::{ExtractError, ParsedDocument};
use crate::types::DocumentFormat;

pub(crate) fn parse(bytes: &[u8]) -> Result<ParsedDocument, ExtractError> {
    let docx = read_docx(bytes).map_err(|e| ExtractError::corrupt(DocumentFormat::Docx, e))?;

    let lines: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => Some(paragraph_text(paragraph)),
            _ => None,
        })
        .collect();

    let sections = lines.iter().filter(|line| !line.trim().is_empty()).count();

    Ok(ParsedDocument {
        text: lines.join("\n"),
        page_count: sections,
    })
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
