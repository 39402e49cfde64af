//! Length conversion – every layout value is carried in millimetres; font
//! sizes are points. Conversion between the two goes through this module.

use crate::error::{Error, Result};

/// Millimetres per typographic point.
pub const MM_PER_PT: f32 = 0.3528;
/// Millimetres per inch.
pub const MM_PER_IN: f32 = 25.4;
/// Millimetres per CSS pixel (96 px per inch).
pub const MM_PER_PX: f32 = 0.2645833;

/// Default line height as a multiple of the font size when no explicit line
/// spacing is configured.
pub const DEFAULT_LINE_HEIGHT_FACTOR: f32 = 1.5;

/// Parse a length string (`"13mm"`, `"11pt"`, `"1in"`, `"96px"`, `"7"`) into
/// millimetres. Values without a suffix are already millimetres.
pub fn to_mm(value: &str) -> Result<f32> {
    let trimmed = value.trim();
    let (number, factor) = if let Some(n) = trimmed.strip_suffix("mm") {
        (n, 1.0)
    } else if let Some(n) = trimmed.strip_suffix("pt") {
        (n, MM_PER_PT)
    } else if let Some(n) = trimmed.strip_suffix("in") {
        (n, MM_PER_IN)
    } else if let Some(n) = trimmed.strip_suffix("px") {
        (n, MM_PER_PX)
    } else {
        (trimmed, 1.0)
    };

    let parsed: f32 = number
        .trim()
        .parse()
        .map_err(|_| Error::InvalidUnit(value.to_string()))?;
    if !parsed.is_finite() {
        return Err(Error::InvalidUnit(value.to_string()));
    }
    Ok(parsed * factor)
}

/// Parse a length string into typographic points.
pub fn to_points(value: &str) -> Result<f32> {
    to_mm(value).map(mm_to_pt)
}

pub fn pt_to_mm(pt: f32) -> f32 {
    pt * MM_PER_PT
}

pub fn mm_to_pt(mm: f32) -> f32 {
    mm / MM_PER_PT
}

/// Line height in mm: the explicit spacing when given, otherwise 1.5 × the
/// font size (both in mm).
pub fn line_height(font_size_mm: f32, line_spacing_mm: Option<f32>) -> f32 {
    line_spacing_mm.unwrap_or(font_size_mm * DEFAULT_LINE_HEIGHT_FACTOR)
}
