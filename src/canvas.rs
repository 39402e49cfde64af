//! Recorded canvas – the in-memory [`DocumentWriter`] used for every render.
//!
//! Drawing calls are recorded per page as [`DrawItem`]s inside a
//! [`CanvasDocument`], the frozen structure between layout and PDF
//! serialisation. It can be inspected, dumped to JSON, and turned into PDF
//! bytes by [`crate::render::render_pdf`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fonts::{FontFamily, FontKey, FontManager};
use crate::images::LoadedImage;
use crate::table::draw_table;
use crate::units::pt_to_mm;
use crate::writer::{DocumentWriter, Table};

/// Default stroke width for lines, in mm.
pub const DEFAULT_LINE_WIDTH: f32 = 0.2;

/// A complete document ready for PDF serialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Title written to the PDF metadata.
    pub title: String,
    /// Page width in mm.
    pub page_width: f32,
    /// Page height in mm.
    pub page_height: f32,
    pub pages: Vec<CanvasPage>,
    /// Images referenced by [`DrawItem::Image`] index.
    pub images: Vec<CanvasImage>,
}

/// One page of recorded drawing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasPage {
    pub items: Vec<DrawItem>,
}

/// A single drawing operation. Positions are mm from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawItem {
    Text {
        text: String,
        x: f32,
        /// Top of the line box.
        y: f32,
        font: FontKey,
        /// Points.
        size: f32,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: [f32; 3],
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: [f32; 3],
    },
    Image {
        image: usize,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasImage {
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    pub px_width: u32,
    pub px_height: u32,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&BASE64_STD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(d)?;
        BASE64_STD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

impl CanvasDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text items of a page (1-based) as `(text, x, y)`.
    pub fn texts(&self, page: usize) -> Vec<(&str, f32, f32)> {
        self.page(page)
            .map(|p| {
                p.items
                    .iter()
                    .filter_map(|item| match item {
                        DrawItem::Text { text, x, y, .. } => Some((text.as_str(), *x, *y)),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All text of a page joined with spaces, for assertions and debugging.
    pub fn page_text(&self, page: usize) -> String {
        self.texts(page)
            .iter()
            .map(|(t, _, _)| *t)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn page(&self, page: usize) -> Option<&CanvasPage> {
        page.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// [`DocumentWriter`] that records into a [`CanvasDocument`].
pub struct PdfCanvas {
    doc: CanvasDocument,
    /// 0-based index of the current page.
    current: usize,
    font: FontKey,
    font_size: f32,
    fonts: FontManager,
}

impl PdfCanvas {
    /// A canvas with one empty page.
    pub fn new(title: &str, page_width: f32, page_height: f32) -> Self {
        Self {
            doc: CanvasDocument {
                title: title.to_string(),
                page_width,
                page_height,
                pages: vec![CanvasPage::default()],
                images: Vec::new(),
            },
            current: 0,
            font: FontKey::new(FontFamily::Helvetica, false, false),
            font_size: 11.0,
            fonts: FontManager::default(),
        }
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.doc
    }

    pub fn into_document(self) -> CanvasDocument {
        self.doc
    }

    pub fn fonts(&self) -> &FontManager {
        &self.fonts
    }

    pub(crate) fn push(&mut self, item: DrawItem) {
        self.doc.pages[self.current].items.push(item);
    }

    /// Line with an explicit stroke; [`DocumentWriter::line`] uses the
    /// default black hairline.
    pub(crate) fn stroke(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: [f32; 3]) {
        self.push(DrawItem::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        });
    }

    pub(crate) fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: [f32; 3]) {
        self.push(DrawItem::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
    }
}

impl DocumentWriter for PdfCanvas {
    fn page_width(&self) -> f32 {
        self.doc.page_width
    }

    fn page_height(&self) -> f32 {
        self.doc.page_height
    }

    fn add_page(&mut self) {
        self.doc.pages.push(CanvasPage::default());
        self.current = self.doc.pages.len() - 1;
    }

    fn page_count(&self) -> usize {
        self.doc.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current + 1
    }

    fn set_page(&mut self, page: usize) {
        self.current = page.clamp(1, self.doc.pages.len()) - 1;
    }

    fn set_font(&mut self, face: &str, bold: bool, italic: bool) {
        self.font = FontKey::new(self.fonts.family_for(face), bold, italic);
    }

    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn text(&mut self, text: &str, x: f32, y: f32) {
        if text.is_empty() {
            return;
        }
        self.push(DrawItem::Text {
            text: text.to_string(),
            x,
            y,
            font: self.font,
            size: self.font_size,
        });
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.stroke(x1, y1, x2, y2, DEFAULT_LINE_WIDTH, [0.0, 0.0, 0.0]);
    }

    fn add_image(&mut self, image: &LoadedImage, x: f32, y: f32, width: f32, height: f32) {
        let index = match self.doc.images.iter().position(|i| i.bytes == image.bytes) {
            Some(existing) => existing,
            None => {
                self.doc.images.push(CanvasImage {
                    bytes: image.bytes.clone(),
                    px_width: image.px_width,
                    px_height: image.px_height,
                });
                self.doc.images.len() - 1
            }
        };
        self.push(DrawItem::Image {
            image: index,
            x,
            y,
            width,
            height,
        });
    }

    fn text_width(&self, text: &str) -> f32 {
        pt_to_mm(self.fonts.measure_text_width(text, self.font_size, self.font))
    }

    fn table(&mut self, table: &Table<'_>) -> f32 {
        draw_table(self, table)
    }
}
