//! Flow renderer – the content pass.
//!
//! Walks the content blocks in order, tokenizes text blocks, decides page
//! breaks before each token and draws paragraphs, headings, lists, tables,
//! separators and blank space onto a [`DocumentWriter`]. The cursor is owned
//! by the renderer and handed back by [`FlowRenderer::run`], which consumes
//! the renderer so a flow can only run once.

use std::fmt;

use serde::Serialize;

use crate::config::{ContentBlock, SeparatorBlock, TextBlock};
use crate::error::Result;
use crate::geometry::PageGeometry;
use crate::inline::parse_runs;
use crate::markdown::{BlockTokenizer, ColumnAlign, MarkdownTokenizer, Token};
use crate::pagination::{effective_bottom_margin, estimate_height, should_break_page, PageBreakEstimate};
use crate::style::{document_style, resolve_style, EffectiveStyle, Typography};
use crate::text::{draw_lines, wrap_runs, Line, TextFont};
use crate::units::to_mm;
use crate::writer::{DocumentWriter, Table, TableStyle};

/// Distance from the content edge to a list marker, in mm.
pub const LIST_MARKER_INDENT: f32 = 4.0;
/// Distance from the content edge to list item text, in mm.
pub const LIST_TEXT_INDENT: f32 = 10.0;

const BULLET: &str = "\u{2022}";

/// Non-fatal problems found while rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Content was drawn past the bottom margin because the block does not
    /// allow page breaks, or a single token is taller than a page.
    Overflow { page: usize, y: f32 },
    /// An image could not be loaded or decoded and was left out.
    ImageUnavailable { image: String, reason: String },
    /// A separator rule was drawn below the bottom margin.
    SeparatorOverflow { page: usize, y: f32 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Overflow { page, y } => {
                write!(f, "content overflows the bottom margin on page {page} at {y:.1}mm")
            }
            Warning::ImageUnavailable { image, reason } => write!(f, "{image} not drawn: {reason}"),
            Warning::SeparatorOverflow { page, y } => {
                write!(f, "separator below the bottom margin on page {page} at {y:.1}mm")
            }
        }
    }
}

/// Vertical position of the flow. `y` is in mm from the top edge of `page`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCursor {
    pub y: f32,
    /// Current page, 1-based.
    pub page: usize,
    pub page_count: usize,
}

/// What a finished flow hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowOutcome {
    pub cursor: RenderCursor,
    pub warnings: Vec<Warning>,
}

/// A block with its style resolved, ready to draw.
enum Prepared<'b> {
    Text {
        block: &'b TextBlock,
        style: EffectiveStyle,
    },
    Separator {
        before: f32,
        after: f32,
    },
}

/// Lays content blocks out on a writer, one page after another.
pub struct FlowRenderer<'a, W: DocumentWriter + ?Sized> {
    writer: &'a mut W,
    tokenizer: &'a dyn BlockTokenizer,
    typography: &'a Typography,
    geometry: PageGeometry,
    estimate: PageBreakEstimate,
    table_style: TableStyle,
    wordmark_placed: bool,
    cursor: RenderCursor,
    warnings: Vec<Warning>,
}

impl<'a, W: DocumentWriter + ?Sized> FlowRenderer<'a, W> {
    /// A renderer starting at the top margin of the writer's current page.
    pub fn new(writer: &'a mut W, typography: &'a Typography, geometry: PageGeometry) -> Self {
        let cursor = RenderCursor {
            y: geometry.top(),
            page: writer.current_page(),
            page_count: writer.page_count(),
        };
        Self {
            writer,
            tokenizer: &MarkdownTokenizer,
            typography,
            geometry,
            estimate: PageBreakEstimate::default(),
            table_style: TableStyle::default(),
            wordmark_placed: false,
            cursor,
            warnings: Vec::new(),
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: &'a dyn BlockTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Start the flow at `y` instead of the top margin.
    pub fn start_at(mut self, y: f32) -> Self {
        self.cursor.y = y;
        self
    }

    /// Reserve clear space above the wordmark on page 1.
    pub fn with_wordmark(mut self, placed: bool) -> Self {
        self.wordmark_placed = placed;
        self
    }

    pub fn with_estimate(mut self, estimate: PageBreakEstimate) -> Self {
        self.estimate = estimate;
        self
    }

    pub fn with_table_style(mut self, style: TableStyle) -> Self {
        self.table_style = style;
        self
    }

    pub fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    /// Render every block. Styles and separator spacings are resolved
    /// before anything is drawn, so an invalid length fails the flow without
    /// touching the writer.
    pub fn run(mut self, blocks: &[ContentBlock]) -> Result<FlowOutcome> {
        let prepared = prepare(self.typography, blocks)?;

        for block in &prepared {
            match block {
                Prepared::Text { block, style } => self.text_block(block, style),
                Prepared::Separator { before, after } => self.separator(*before, *after),
            }
        }

        self.cursor.page_count = self.writer.page_count();
        log::debug!(
            "Content pass finished on page {}/{} at {:.1}mm",
            self.cursor.page,
            self.cursor.page_count,
            self.cursor.y
        );
        Ok(FlowOutcome {
            cursor: self.cursor,
            warnings: self.warnings,
        })
    }

    fn text_block(&mut self, block: &TextBlock, style: &EffectiveStyle) {
        if block.content.trim().is_empty() {
            return;
        }
        for token in self.tokenizer.tokenize(&block.content) {
            self.token(&token, style, block.allow_page_break);
        }
    }

    fn token(&mut self, token: &Token, style: &EffectiveStyle, allow_break: bool) {
        let left = self.geometry.left();
        let width = self.geometry.content_width();

        match token {
            Token::Paragraph(text) => {
                let font = TextFont {
                    face: &style.font_face,
                    size: style.size_normal,
                    bold: false,
                };
                self.wrapped(text, font, style, left, width, allow_break);
                self.cursor.y += style.paragraph_spacing;
            }
            Token::Heading { level, text } => {
                let font = TextFont {
                    face: &style.font_face,
                    size: style.heading_size(*level),
                    bold: true,
                };
                self.wrapped(text, font, style, left, width, allow_break);
                self.cursor.y += style.paragraph_spacing;
            }
            Token::List { ordered, items } => {
                for (index, item) in items.iter().enumerate() {
                    let marker = if *ordered {
                        format!("{}.", index + 1)
                    } else {
                        BULLET.to_string()
                    };
                    self.list_item(&marker, item, style, allow_break);
                }
                self.cursor.y += style.paragraph_spacing;
            }
            Token::Table { header, rows, align } => {
                self.table(header, rows, align, style, allow_break);
            }
            Token::Space => {
                self.cursor.y += style.line_spacing;
            }
        }
    }

    /// Wrap, check for a break, draw and advance by the drawn lines.
    fn wrapped(
        &mut self,
        text: &str,
        font: TextFont<'_>,
        style: &EffectiveStyle,
        x: f32,
        width: f32,
        allow_break: bool,
    ) {
        let lines = wrap_runs(&mut *self.writer, &parse_runs(text), font, width);
        let warned = self.ensure_room(self.estimate_for(&lines, style), allow_break);
        self.draw(&lines, font, style, x, width);
        if !warned {
            self.check_drawn_overflow();
        }
    }

    fn list_item(&mut self, marker: &str, text: &str, style: &EffectiveStyle, allow_break: bool) {
        let font = TextFont {
            face: &style.font_face,
            size: style.size_normal,
            bold: false,
        };
        let text_x = self.geometry.left() + LIST_TEXT_INDENT;
        let text_width = self.geometry.content_width() - LIST_TEXT_INDENT;

        let lines = wrap_runs(&mut *self.writer, &parse_runs(text), font, text_width);
        let warned = self.ensure_room(self.estimate_for(&lines, style), allow_break);

        self.writer.set_font(&style.font_face, false, false);
        self.writer.set_font_size(style.size_normal);
        self.writer
            .text(marker, self.geometry.left() + LIST_MARKER_INDENT, self.cursor.y);
        self.draw(&lines, font, style, text_x, text_width);
        if !warned {
            self.check_drawn_overflow();
        }
    }

    fn table(
        &mut self,
        header: &[String],
        rows: &[Vec<String>],
        align: &[ColumnAlign],
        style: &EffectiveStyle,
        allow_break: bool,
    ) {
        self.ensure_room(estimate_height(self.estimate, style.line_spacing, None), allow_break);

        let table = Table {
            header,
            rows,
            align,
            style: self.table_style,
            font_face: &style.font_face,
            font_size: style.size_normal,
            x: self.geometry.left(),
            width: self.geometry.content_width(),
            start_y: self.cursor.y,
            top_margin: self.geometry.top(),
            bottom_margin: self.bottom_margin(),
        };
        let end = self.writer.table(&table);

        self.cursor.page = self.writer.current_page();
        self.cursor.page_count = self.writer.page_count();
        self.cursor.y = end + style.paragraph_spacing;
    }

    fn separator(&mut self, before: f32, after: f32) {
        let y = self.cursor.y + before;
        if y > self.geometry.height - self.bottom_margin() {
            log::warn!(
                "Separator drawn below the bottom margin on page {} at {:.1}mm",
                self.cursor.page,
                y
            );
            self.warnings.push(Warning::SeparatorOverflow {
                page: self.cursor.page,
                y,
            });
        }
        self.writer
            .line(self.geometry.left(), y, self.geometry.right(), y);
        self.cursor.y += before + after;
    }

    fn draw(&mut self, lines: &[Line], font: TextFont<'_>, style: &EffectiveStyle, x: f32, width: f32) {
        draw_lines(
            &mut *self.writer,
            lines,
            font,
            x,
            width,
            self.cursor.y,
            style.line_spacing,
            style.align,
        );
        self.cursor.y += lines.len() as f32 * style.line_spacing;
    }

    fn estimate_for(&self, lines: &[Line], style: &EffectiveStyle) -> f32 {
        estimate_height(self.estimate, style.line_spacing, Some(lines.len()))
    }

    fn bottom_margin(&self) -> f32 {
        effective_bottom_margin(self.cursor.page, self.geometry.margin_y, self.wordmark_placed)
    }

    /// Break to the next page when `height` does not fit, or record an
    /// overflow when breaking is not allowed or would not help. Returns
    /// whether an overflow was recorded.
    fn ensure_room(&mut self, height: f32, allow_break: bool) -> bool {
        if !should_break_page(self.cursor.y, height, self.geometry.height, self.bottom_margin()) {
            return false;
        }
        if allow_break && self.cursor.y > self.geometry.top() {
            self.next_page();
            return false;
        }
        self.overflow();
        true
    }

    /// The estimate can let a tall token through; catch it once drawn.
    fn check_drawn_overflow(&mut self) {
        if self.cursor.y > self.geometry.height - self.bottom_margin() {
            self.overflow();
        }
    }

    fn overflow(&mut self) {
        log::warn!(
            "Content overflows the bottom margin on page {} at {:.1}mm",
            self.cursor.page,
            self.cursor.y
        );
        self.warnings.push(Warning::Overflow {
            page: self.cursor.page,
            y: self.cursor.y,
        });
    }

    fn next_page(&mut self) {
        if self.cursor.page < self.writer.page_count() {
            self.writer.set_page(self.cursor.page + 1);
        } else {
            self.writer.add_page();
        }
        self.cursor.page = self.writer.current_page();
        self.cursor.page_count = self.writer.page_count();
        self.cursor.y = self.geometry.top();
        log::debug!("Page break: continuing on page {}", self.cursor.page);
    }
}

fn prepare<'b>(typography: &Typography, blocks: &'b [ContentBlock]) -> Result<Vec<Prepared<'b>>> {
    let doc_style = document_style(typography)?;
    blocks
        .iter()
        .map(|block| match block {
            ContentBlock::Text(text) => Ok(Prepared::Text {
                block: text,
                style: resolve_style(typography, &text.style)?,
            }),
            ContentBlock::Separator(sep) => {
                let (before, after) = separator_spacing(sep, doc_style.paragraph_spacing)?;
                Ok(Prepared::Separator { before, after })
            }
        })
        .collect()
}

/// Resolve every block's lengths without drawing anything.
pub fn validate_blocks(typography: &Typography, blocks: &[ContentBlock]) -> Result<()> {
    prepare(typography, blocks).map(|_| ())
}

/// Spacing before and after a separator. Before defaults to the document
/// paragraph spacing, after to twice the spacing before.
pub fn separator_spacing(sep: &SeparatorBlock, paragraph_spacing: f32) -> Result<(f32, f32)> {
    let length = |value: &Option<String>| -> Result<Option<f32>> {
        match value.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => to_mm(v).map(Some),
            _ => Ok(None),
        }
    };
    let before = length(&sep.spacing_before)?.unwrap_or(paragraph_spacing);
    let after = length(&sep.spacing_after)?.unwrap_or(before * 2.0);
    Ok((before, after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawItem, PdfCanvas};
    use crate::error::Error;
    use crate::geometry::PageType;
    use crate::style::StyleOverrides;

    fn geometry() -> PageGeometry {
        PageGeometry::resolve(PageType::Letter, "38mm", "13mm").unwrap()
    }

    fn canvas() -> PdfCanvas {
        PdfCanvas::new("flow", 215.9, 279.4)
    }

    fn run(canvas: &mut PdfCanvas, blocks: &[ContentBlock]) -> FlowOutcome {
        let typography = Typography::default();
        FlowRenderer::new(canvas, &typography, geometry())
            .run(blocks)
            .unwrap()
    }

    #[test]
    fn short_paragraph_advances_one_line_plus_spacing() {
        let mut c = canvas();
        let out = run(&mut c, &[ContentBlock::text("Hello")]);
        assert_eq!(out.cursor.page, 1);
        assert_eq!(out.cursor.page_count, 1);
        assert!((out.cursor.y - (13.0 + 7.0 + 11.0)).abs() < 1e-4);
        assert_eq!(c.document().texts(1), vec![("Hello", 38.0, 13.0)]);
    }

    #[test]
    fn empty_block_is_a_no_op() {
        let mut c = canvas();
        let out = run(&mut c, &[ContentBlock::text("   \n  ")]);
        assert_eq!(out.cursor.y, 13.0);
        assert!(c.document().pages[0].items.is_empty());
    }

    #[test]
    fn ordered_list_markers_count_from_one() {
        let mut c = canvas();
        run(&mut c, &[ContentBlock::text("1. alpha\n2. beta\n7. gamma")]);
        let markers: Vec<&str> = c
            .document()
            .texts(1)
            .into_iter()
            .filter(|(_, x, _)| *x == 38.0 + LIST_MARKER_INDENT)
            .map(|(t, _, _)| t)
            .collect();
        assert_eq!(markers, vec!["1.", "2.", "3."]);
    }

    #[test]
    fn later_ordered_lists_restart_at_one() {
        let mut c = canvas();
        let blocks = [
            ContentBlock::text("Opening paragraph."),
            ContentBlock::text("1. alpha\n2. beta"),
            ContentBlock::text("A paragraph between the lists."),
            ContentBlock::text("5. gamma\n6. delta\n7. epsilon"),
        ];
        run(&mut c, &blocks);
        let markers: Vec<&str> = c
            .document()
            .texts(1)
            .into_iter()
            .filter(|(_, x, _)| *x == 38.0 + LIST_MARKER_INDENT)
            .map(|(t, _, _)| t)
            .collect();
        assert_eq!(markers, vec!["1.", "2.", "1.", "2.", "3."]);
    }

    #[test]
    fn list_spacing_applies_once() {
        let mut c = canvas();
        let out = run(&mut c, &[ContentBlock::text("- one\n- two")]);
        assert!((out.cursor.y - (13.0 + 2.0 * 7.0 + 11.0)).abs() < 1e-4);
        assert_eq!(c.document().texts(1)[0].0, BULLET);
    }

    #[test]
    fn separator_advances_before_plus_after() {
        let mut c = canvas();
        let sep = SeparatorBlock {
            spacing_before: Some("5mm".to_string()),
            spacing_after: Some("8mm".to_string()),
        };
        let out = run(&mut c, &[ContentBlock::from(sep)]);
        assert!((out.cursor.y - 26.0).abs() < 1e-4);
        match &c.document().pages[0].items[0] {
            DrawItem::Line { x1, y1, x2, y2, .. } => {
                assert_eq!((*x1, *y1), (38.0, 18.0));
                assert!((*x2 - (215.9 - 38.0)).abs() < 1e-4);
                assert_eq!(*y2, 18.0);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn separator_defaults() {
        assert_eq!(separator_spacing(&SeparatorBlock::default(), 11.0).unwrap(), (11.0, 22.0));
        let sep = SeparatorBlock {
            spacing_before: Some("4mm".to_string()),
            spacing_after: None,
        };
        assert_eq!(separator_spacing(&sep, 11.0).unwrap(), (4.0, 8.0));
    }

    #[test]
    fn separator_never_breaks() {
        let mut c = canvas();
        let typography = Typography::default();
        let out = FlowRenderer::new(&mut c, &typography, geometry())
            .start_at(270.0)
            .run(&[ContentBlock::separator()])
            .unwrap();
        assert_eq!(out.cursor.page_count, 1);
        assert!(matches!(out.warnings[0], Warning::SeparatorOverflow { page: 1, .. }));
    }

    #[test]
    fn breaks_before_a_token_that_does_not_fit() {
        let mut c = canvas();
        let typography = Typography::default();
        let out = FlowRenderer::new(&mut c, &typography, geometry())
            .start_at(250.0)
            .run(&[ContentBlock::text("Near the bottom")])
            .unwrap();
        assert_eq!(out.cursor.page, 2);
        assert!(c.document().texts(1).is_empty());
        assert_eq!(c.document().texts(2)[0], ("Near", 38.0, 13.0));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn keep_together_overflows_with_warning() {
        let mut c = canvas();
        let typography = Typography::default();
        let block = TextBlock::new("Must stay").keep_together();
        let out = FlowRenderer::new(&mut c, &typography, geometry())
            .start_at(250.0)
            .run(&[ContentBlock::from(block)])
            .unwrap();
        assert_eq!(out.cursor.page_count, 1);
        assert_eq!(out.warnings, vec![Warning::Overflow { page: 1, y: 250.0 }]);
        assert_eq!(c.document().page_text(1), "Must stay");
    }

    #[test]
    fn paragraph_taller_than_the_page_is_reported() {
        let mut c = canvas();
        let out = run(&mut c, &[ContentBlock::text("word ".repeat(1200))]);
        assert_eq!(out.cursor.page_count, 1);
        assert!(out.cursor.y > 279.4 - 13.0);
        assert_eq!(out.warnings.len(), 1);
        match out.warnings[0] {
            Warning::Overflow { page, y } => {
                assert_eq!(page, 1);
                // reported at the end of the drawn text, before paragraph spacing
                assert!((y + 11.0 - out.cursor.y).abs() < 1e-3);
            }
            ref other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn cursor_reflects_start_position() {
        let mut c = canvas();
        c.add_page();
        let typography = Typography::default();
        let renderer = FlowRenderer::new(&mut c, &typography, geometry()).start_at(40.0);
        assert_eq!(
            renderer.cursor(),
            RenderCursor {
                y: 40.0,
                page: 2,
                page_count: 2
            }
        );
    }

    #[test]
    fn wordmark_raises_first_page_limit() {
        // 240 + 21 = 261 fits under 266.4 but not under 279.4 - 24.25.
        let typography = Typography::default();
        let mut plain = canvas();
        let out = FlowRenderer::new(&mut plain, &typography, geometry())
            .start_at(240.0)
            .run(&[ContentBlock::text("x")])
            .unwrap();
        assert_eq!(out.cursor.page, 1);

        let mut marked = canvas();
        let out = FlowRenderer::new(&mut marked, &typography, geometry())
            .start_at(240.0)
            .with_wordmark(true)
            .run(&[ContentBlock::text("x")])
            .unwrap();
        assert_eq!(out.cursor.page, 2);
    }

    #[test]
    fn headings_use_level_size_and_bold() {
        let mut c = canvas();
        run(&mut c, &[ContentBlock::text("# Big\n\n#### Deep")]);
        let sizes: Vec<(f32, bool)> = c.document().pages[0]
            .items
            .iter()
            .filter_map(|i| match i {
                DrawItem::Text { size, font, .. } => Some((*size, font.bold)),
                _ => None,
            })
            .collect();
        assert_eq!(sizes.len(), 2);
        assert!((sizes[0].0 - 16.0).abs() < 0.01 && sizes[0].1);
        assert!((sizes[1].0 - 14.0).abs() < 0.01 && sizes[1].1);
    }

    #[test]
    fn extra_blank_lines_add_space() {
        let mut c = canvas();
        let out = run(&mut c, &[ContentBlock::text("a\n\n\nb")]);
        // two paragraphs plus one blank line of space
        assert!((out.cursor.y - (13.0 + 2.0 * (7.0 + 11.0) + 7.0)).abs() < 1e-4);
    }

    #[test]
    fn block_overrides_apply() {
        let mut c = canvas();
        let style = StyleOverrides {
            line_spacing: Some("10mm".to_string()),
            paragraph_spacing: Some("2mm".to_string()),
            ..StyleOverrides::default()
        };
        let out = run(&mut c, &[ContentBlock::from(TextBlock::new("x").with_style(style))]);
        assert!((out.cursor.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn invalid_length_fails_before_drawing() {
        let mut c = canvas();
        let typography = Typography::default();
        let style = StyleOverrides {
            paragraph_spacing: Some("lots".to_string()),
            ..StyleOverrides::default()
        };
        let blocks = [
            ContentBlock::text("drawn?"),
            TextBlock::new("x").with_style(style).into(),
        ];
        let err = FlowRenderer::new(&mut c, &typography, geometry())
            .run(&blocks)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUnit(_)));
        assert!(c.document().pages[0].items.is_empty());
    }

    #[test]
    fn table_resyncs_cursor_with_writer() {
        let mut c = canvas();
        let mut content = String::from("| Name | Value |\n|---|---:|\n");
        for i in 0..80 {
            content.push_str(&format!("| row {i} | {i} |\n"));
        }
        let out = run(&mut c, &[ContentBlock::text(content)]);
        assert!(out.cursor.page >= 2);
        assert_eq!(out.cursor.page, c.current_page());
        assert_eq!(out.cursor.page_count, c.page_count());
    }

    #[test]
    fn measured_estimate_breaks_long_paragraphs_early() {
        let long = "word ".repeat(400);
        let typography = Typography::default();

        let mut c = canvas();
        let out = FlowRenderer::new(&mut c, &typography, geometry())
            .start_at(150.0)
            .with_estimate(PageBreakEstimate::Measured)
            .run(&[ContentBlock::text(long.clone())])
            .unwrap();
        assert_eq!(out.cursor.page, 2);
        assert!(c.document().pages[0].items.is_empty());

        let mut c = canvas();
        let out = FlowRenderer::new(&mut c, &typography, geometry())
            .start_at(150.0)
            .run(&[ContentBlock::text(long)])
            .unwrap();
        assert_eq!(out.cursor.page, 1);
    }
}
