//! Font selection and text measurement for the PDF builtin fonts.
//!
//! Letters are drawn with the standard-14 fonts, which need no embedding.
//! Widths are estimated from per-family average advances; this keeps layout
//! deterministic without shipping font files.

use std::cell::RefCell;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A builtin font family.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontFamily {
    Helvetica,
    Times,
    Courier,
}

/// A concrete font: family plus weight / slant.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontKey {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FontKey {
    pub fn new(family: FontFamily, bold: bool, italic: bool) -> Self {
        Self {
            family,
            bold,
            italic,
        }
    }
}

/// Maps face names to builtin families and measures strings.
pub struct FontManager {
    /// Face names already reported as unknown, so each is warned about once.
    warned: RefCell<HashSet<String>>,
}

impl FontManager {
    pub fn new() -> Self {
        Self {
            warned: RefCell::new(HashSet::new()),
        }
    }

    /// Resolve a face name such as `"Helvetica"`, `"Times New Roman"` or
    /// `"courier"`. Unknown faces fall back to Helvetica.
    pub fn family_for(&self, face: &str) -> FontFamily {
        let lower = face.trim().to_ascii_lowercase();
        if lower.starts_with("helvetica") || lower == "arial" || lower == "sans-serif" {
            FontFamily::Helvetica
        } else if lower.starts_with("times") || lower == "serif" {
            FontFamily::Times
        } else if lower.starts_with("courier") || lower == "monospace" {
            FontFamily::Courier
        } else {
            if self.warned.borrow_mut().insert(lower) {
                log::warn!("Font face {face:?} is not a builtin font; using Helvetica");
            }
            FontFamily::Helvetica
        }
    }

    /// Measure the width of a string in points at `font_size` points.
    ///
    /// Average advance per character as a fraction of the font size:
    /// Helvetica 0.5 (bold 0.55), Times 0.45 (bold 0.5), Courier 0.6.
    pub fn measure_text_width(&self, text: &str, font_size: f32, key: FontKey) -> f32 {
        let avg = match (key.family, key.bold) {
            (FontFamily::Helvetica, false) => 0.5,
            (FontFamily::Helvetica, true) => 0.55,
            (FontFamily::Times, false) => 0.45,
            (FontFamily::Times, true) => 0.5,
            (FontFamily::Courier, _) => 0.6,
        };
        text.chars().count() as f32 * font_size * avg
    }
}

impl Default for FontManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Word-wrap plain text to fit within `max_width` points. Existing newlines
/// are kept as hard breaks. Returns at least one (possibly empty) line.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    key: FontKey,
    max_width: f32,
    fonts: &FontManager,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            let w = fonts.measure_text_width(&candidate, font_size, key);
            if w > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
