//! Page geometry – physical page sizes and the content area left inside the
//! margins. All values are millimetres.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::units::to_mm;

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// US Letter, 8.5" × 11" (default).
    #[default]
    Letter,
    /// US Legal, 8.5" × 14".
    Legal,
    /// ISO A4.
    A4,
}

impl<'de> Deserialize<'de> for PageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(PageType::from_name(&name))
    }
}

impl PageType {
    /// Look a page type up by name. Unknown names resolve to
    /// [`PageType::Letter`], the first entry of the size table.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "letter" | "standard" => PageType::Letter,
            "legal" | "legal-length" => PageType::Legal,
            "a4" | "a4-equivalent" | "oversized" => PageType::A4,
            other => {
                log::warn!("Unknown page type {other:?}; using letter");
                PageType::Letter
            }
        }
    }

    /// `(width, height)` in millimetres.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageType::Letter => (215.9, 279.4),
            PageType::Legal => (215.9, 355.6),
            PageType::A4 => (210.0, 297.0),
        }
    }
}

pub fn available_width(page_width: f32, left_margin: f32, right_margin: f32) -> f32 {
    page_width - left_margin - right_margin
}

pub fn available_height(page_height: f32, top_margin: f32, bottom_margin: f32) -> f32 {
    page_height - top_margin - bottom_margin
}

/// Resolved page size and margins for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    /// Left and right margin.
    pub margin_x: f32,
    /// Top and bottom margin.
    pub margin_y: f32,
}

impl PageGeometry {
    /// Resolve a page type and margin strings (`"38mm"`, `"1in"`, ...).
    pub fn resolve(page_type: PageType, x_margin: &str, y_margin: &str) -> Result<Self> {
        let (width, height) = page_type.dimensions();
        Ok(Self {
            width,
            height,
            margin_x: to_mm(x_margin)?,
            margin_y: to_mm(y_margin)?,
        })
    }

    pub fn content_width(&self) -> f32 {
        available_width(self.width, self.margin_x, self.margin_x)
    }

    pub fn content_height(&self) -> f32 {
        available_height(self.height, self.margin_y, self.margin_y)
    }

    pub fn left(&self) -> f32 {
        self.margin_x
    }

    pub fn right(&self) -> f32 {
        self.width - self.margin_x
    }

    pub fn top(&self) -> f32 {
        self.margin_y
    }
}
