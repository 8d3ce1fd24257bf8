// DOCX rendering via docx-rs: one paragraph per line so the text survives a
// round trip through the extractor.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run};

use crate::export::ExportError;
use crate::types::DocumentFormat;

pub fn render(text: &str) -> Result<Vec<u8>, ExportError> {
    let docx = text.lines().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(line_run(line)))
    });

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::render_failed(DocumentFormat::Docx, e))?;
    Ok(buf.into_inner())
}

/// Tabs become `<w:tab/>` elements; Word ignores literal tab characters in text.
fn line_run(line: &str) -> Run {
    let mut pieces = line.split('\t');
    let first = pieces.next().unwrap_or_default();
    pieces.fold(Run::new().add_text(first), |run, piece| run.add_tab().add_text(piece))
}
