// PDF rendering via lopdf
// A4, built-in Courier so line widths are exact without embedding a font.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::export::ExportError;
use crate::types::DocumentFormat;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_X: i64 = 50;
const TOP_Y: i64 = 800;
const BOTTOM_Y: i64 = 40;
const LINE_HEIGHT: i64 = 16;
const FONT_SIZE: i64 = 11;
/// Courier advances 600/1000 em per glyph.
const GLYPH_WIDTH: f64 = FONT_SIZE as f64 * 0.6;

pub fn render(text: &str) -> Result<Vec<u8>, ExportError> {
    let lines = layout(text);
    let lines_per_page = ((TOP_Y - BOTTOM_Y) / LINE_HEIGHT + 1) as usize;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    let chunks: Vec<&[String]> = if lines.is_empty() {
        vec![lines.as_slice()]
    } else {
        lines.chunks(lines_per_page).collect()
    };
    for chunk in chunks {
        let page_id = add_page(&mut doc, pages_id, chunk)?;
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf)
        .map_err(|e| ExportError::render_failed(DocumentFormat::Pdf, e))?;
    Ok(buf)
}

fn add_page(doc: &mut Document, pages_id: ObjectId, lines: &[String]) -> Result<ObjectId, ExportError> {
    let mut operations = Vec::with_capacity(lines.len() * 5);
    let mut y = TOP_Y;
    for line in lines {
        // Each line is its own text object so extraction sees a line break.
        if !line.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), FONT_SIZE.into()]));
            operations.push(Operation::new("Td", vec![MARGIN_X.into(), y.into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(encode_latin1(line))]));
            operations.push(Operation::new("ET", vec![]));
        }
        y -= LINE_HEIGHT;
    }

    let content = Content { operations };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::render_failed(DocumentFormat::Pdf, e))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));

    Ok(doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    }))
}

/// Split text into physical lines that fit the printable width.
// Latin-1 encoding has no glyph for a tab.
const TAB_SPACES: &str = "    ";

fn layout(text: &str) -> Vec<String> {
    let max_chars = ((PAGE_WIDTH - 2 * MARGIN_X) as f64 / GLYPH_WIDTH).floor() as usize;
    text.lines()
        .map(|line| line.replace('\t', TAB_SPACES))
        .flat_map(|line| wrap_line(&line, max_chars))
        .collect()
}

fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let line = line.trim_end();
    if line.chars().count() <= max_chars {
        return vec![line.to_string()];
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };

        if needed <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }

        // Hard-break words longer than a full line.
        let chars: Vec<char> = word.chars().collect();
        let mut pieces = chars.chunks(max_chars).peekable();
        while let Some(piece) = pieces.next() {
            if pieces.peek().is_some() {
                out.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// WinAnsi covers Latin-1 for the printable range; anything else becomes '?'.
fn encode_latin1(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}
