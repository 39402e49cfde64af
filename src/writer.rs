//! The drawing surface the flow renderer and decoration pass talk to.
//!
//! Coordinates are millimetres with the origin at the top-left corner of the
//! page; `y` of a text call is the top of the line box. Font sizes are
//! points. Pages are numbered from 1.

use serde::{Deserialize, Serialize};

use crate::images::LoadedImage;
use crate::markdown::ColumnAlign;

/// Visual treatment of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableTheme {
    /// Filled header, borders around every cell.
    #[default]
    Grid,
    /// Filled header, alternating row shading, no vertical rules.
    Striped,
    /// Text only.
    Plain,
}

/// Style bundle handed to [`DocumentWriter::table`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    pub theme: TableTheme,
    pub header_bold: bool,
    /// RGB, 0.0 – 1.0.
    pub header_fill: [f32; 3],
    pub border_color: [f32; 3],
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            theme: TableTheme::Grid,
            header_bold: true,
            header_fill: [0.9, 0.9, 0.9],
            border_color: [0.6, 0.6, 0.6],
        }
    }
}

/// A table to lay out starting at `start_y` on the current page.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    pub header: &'a [String],
    pub rows: &'a [Vec<String>],
    pub align: &'a [ColumnAlign],
    pub style: TableStyle,
    pub font_face: &'a str,
    /// Points.
    pub font_size: f32,
    pub x: f32,
    pub width: f32,
    pub start_y: f32,
    /// Where continued rows start on a new page.
    pub top_margin: f32,
    /// Rows never extend below `page_height - bottom_margin` unless a single
    /// row is taller than a page.
    pub bottom_margin: f32,
}

/// Abstract document target: pages, text, lines, images, measurement and
/// tabular layout.
pub trait DocumentWriter {
    fn page_width(&self) -> f32;

    fn page_height(&self) -> f32;

    /// Append a page and make it current.
    fn add_page(&mut self);

    fn page_count(&self) -> usize;

    /// The page drawing calls go to (1-based).
    fn current_page(&self) -> usize;

    /// Switch the current page. Out-of-range numbers are clamped.
    fn set_page(&mut self, page: usize);

    fn set_font(&mut self, face: &str, bold: bool, italic: bool);

    fn set_font_size(&mut self, size: f32);

    /// Draw `text` with the current font, its line box top at `y`.
    fn text(&mut self, text: &str, x: f32, y: f32);

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32);

    /// Draw `image` into the box at (`x`, `y`) of the given size.
    fn add_image(&mut self, image: &LoadedImage, x: f32, y: f32, width: f32, height: f32);

    /// Width of `text` in mm with the current font and size.
    fn text_width(&self, text: &str) -> f32;

    /// Lay out a table, adding or moving to following pages as needed.
    /// Returns the y just below the last row on the page where it ended.
    fn table(&mut self, table: &Table<'_>) -> f32;
}
