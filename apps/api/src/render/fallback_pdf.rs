//! Last-resort PDF: a single letter-size page of plain Helvetica text drawn from
//! the LaTeX markup, used when no compiler produced an artifact.

use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::render::RenderError;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 50;
const TITLE_Y: i64 = 750;
const DATE_Y: i64 = 720;
const BODY_START_Y: i64 = 680;
const LINE_HEIGHT: i64 = 15;
const BOTTOM_MARGIN: i64 = 50;
const MAX_LINE_CHARS: usize = 80;

/// Renders the minimal document and returns the encoded PDF bytes.
pub fn render_minimal_pdf(
    title: &str,
    latex: &str,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, RenderError> {
    let mut ops = Vec::new();
    text_at(&mut ops, "F2", 16, TITLE_Y, title.trim());
    text_at(
        &mut ops,
        "F1",
        12,
        DATE_Y,
        &format!("Generated on: {}", generated_at.format("%Y-%m-%d %H:%M")),
    );

    let mut y = BODY_START_Y - LINE_HEIGHT;
    for line in latex.lines().filter(|l| !l.trim().is_empty()) {
        if y < BOTTOM_MARGIN {
            break;
        }
        let shown: String = line.chars().take(MAX_LINE_CHARS).collect();
        text_at(&mut ops, "F1", 10, y, &shown);
        y -= LINE_HEIGHT;
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular = doc.add_object(font("Helvetica"));
    let bold = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => regular, "F2" => bold },
    });

    let content = Content { operations: ops }
        .encode()
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    Ok(bytes)
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

fn text_at(ops: &mut Vec<Operation>, font: &str, size: i64, y: i64, text: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![LEFT_MARGIN.into(), y.into()]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

/// Standard Type1 fonts only cover single-byte encodings; anything outside
/// Latin-1 is shown as '?'.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
