//! PDF output for sheet layouts, built with `lopdf`

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use super::{Rect, SheetConfig, SheetLayout};
use crate::renderer::{RenderError, RenderResult};

const PT_PER_MM: f64 = 72.0 / 25.4;

/// Page content in PDF user space (points, origin bottom-left)
struct PageContent {
    height_mm: f64,
    font_size: f32,
    operations: Vec<Operation>,
}

impl PageContent {
    fn new(config: &SheetConfig) -> Self {
        Self {
            height_mm: config.height_mm,
            font_size: pt(config.font_size_mm),
            operations: Vec::new(),
        }
    }

    fn rect(&mut self, r: &Rect, stroke_mm: f64) {
        let bottom = self.height_mm - (r.y + r.height);
        self.operations.push(Operation::new("w", vec![Object::from(pt(stroke_mm))]));
        self.operations.push(Operation::new(
            "re",
            vec![
                Object::from(pt(r.x)),
                Object::from(pt(bottom)),
                Object::from(pt(r.width)),
                Object::from(pt(r.height)),
            ],
        ));
        self.operations.push(Operation::new("S", vec![]));
    }

    fn text(&mut self, x_mm: f64, y_mm: f64, text: &str, bold: bool) {
        let font = if bold { "F2" } else { "F1" };
        self.operations.push(Operation::new("BT", vec![]));
        self.operations.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), Object::from(self.font_size)],
        ));
        self.operations.push(Operation::new(
            "Td",
            vec![
                Object::from(pt(x_mm)),
                Object::from(pt(self.height_mm - y_mm)),
            ],
        ));
        self.operations.push(Operation::new("Tj", vec![Object::string_literal(latin1(text))]));
        self.operations.push(Operation::new("ET", vec![]));
    }

    fn finish(self) -> Content {
        Content {
            operations: self.operations,
        }
    }
}

/// Render a laid-out sheet as a one-page PDF
pub(super) fn render(layout: &SheetLayout, config: &SheetConfig) -> RenderResult<Vec<u8>> {
    let mut page = PageContent::new(config);
    let line = config.font_size_mm * 1.4;

    page.rect(&layout.border, 0.7);
    let tb = &layout.title_block;
    page.rect(tb, 0.5);
    page.text(tb.x + line, tb.y + 1.5 * line, &layout.title, true);
    page.text(tb.x + line, tb.y + 2.7 * line, &layout.template, false);

    for frame in &layout.frames {
        page.rect(&frame.rect, 0.25);
        let x = frame.rect.x + line;
        let mut y = frame.rect.y + 1.5 * line;
        page.text(x, y, &frame.heading, true);
        for text in &frame.lines {
            y += line;
            page.text(x, y, text, false);
        }
    }

    let content = page
        .finish()
        .encode()
        .map_err(|e| RenderError::Export(e.to_string()))?;

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let regular = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold = document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });
    let content_id = document.add_object(Stream::new(Dictionary::new(), content));
    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::from(0.0f32),
            Object::from(0.0f32),
            Object::from(pt(config.width_mm)),
            Object::from(pt(config.height_mm)),
        ],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = document.add_object(dictionary! {
        "Title" => Object::string_literal(latin1(&layout.title)),
        "Subject" => Object::string_literal(latin1(&layout.template)),
    });
    document.trailer.set("Root", catalog_id);
    document.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    document
        .save_to(&mut bytes)
        .map_err(|e| RenderError::Export(e.to_string()))?;
    Ok(bytes)
}

fn pt(mm: f64) -> f32 {
    (mm * PT_PER_MM) as f32
}

/// Encode text for the standard fonts; characters outside Latin-1 become '?'
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
