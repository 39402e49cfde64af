//! Style resolver – merges per-block typography overrides with the document
//! defaults into a flat [`EffectiveStyle`] consumed by the flow renderer.
//!
//! Every attribute is resolved on its own: the block value wins when it is
//! present and non-empty, otherwise the document default applies.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::units::{line_height, pt_to_mm, to_mm, to_points};

/// Horizontal alignment of body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    /// Justified: every wrapped line except the last is stretched to the
    /// full content width.
    Full,
}

/// Document-level typography, as length strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub font_face: String,
    pub text_size_normal: String,
    pub text_size_heading1: String,
    pub text_size_heading2: String,
    pub text_size_heading3: String,
    pub text_align: TextAlign,
    pub paragraph_spacing: String,
    pub line_spacing: String,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_face: "Helvetica".to_string(),
            text_size_normal: "11pt".to_string(),
            text_size_heading1: "16pt".to_string(),
            text_size_heading2: "14pt".to_string(),
            text_size_heading3: "12pt".to_string(),
            text_align: TextAlign::Left,
            paragraph_spacing: "11mm".to_string(),
            line_spacing: "7mm".to_string(),
        }
    }
}

/// Optional per-block typography. `None` and empty strings inherit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOverrides {
    pub font_face: Option<String>,
    pub text_size_normal: Option<String>,
    pub text_size_heading1: Option<String>,
    pub text_size_heading2: Option<String>,
    pub text_size_heading3: Option<String>,
    pub text_align: Option<TextAlign>,
    pub paragraph_spacing: Option<String>,
    pub line_spacing: Option<String>,
}

/// Fully resolved style for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveStyle {
    pub font_face: String,
    /// Body text size in points.
    pub size_normal: f32,
    pub size_h1: f32,
    pub size_h2: f32,
    pub size_h3: f32,
    pub align: TextAlign,
    /// Distance between consecutive baselines, in mm.
    pub line_spacing: f32,
    /// Extra space after a paragraph, heading or list, in mm.
    pub paragraph_spacing: f32,
}

impl EffectiveStyle {
    /// Heading size for a level; levels beyond 3 use the H2 size.
    pub fn heading_size(&self, level: u8) -> f32 {
        match level {
            1 => self.size_h1,
            2 => self.size_h2,
            3 => self.size_h3,
            _ => self.size_h2,
        }
    }
}

/// First non-empty value wins.
pub fn pick<'a>(over: Option<&'a str>, default: &'a str) -> &'a str {
    match over {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}

/// Resolve the effective style of a block against the document defaults.
pub fn resolve_style(defaults: &Typography, overrides: &StyleOverrides) -> Result<EffectiveStyle> {
    let size = |over: &Option<String>, default: &str| to_points(pick(over.as_deref(), default));

    let size_normal = size(&overrides.text_size_normal, &defaults.text_size_normal)?;
    let line_spacing = match pick(overrides.line_spacing.as_deref(), &defaults.line_spacing) {
        s if s.trim().is_empty() => line_height(pt_to_mm(size_normal), None),
        s => to_mm(s)?,
    };

    Ok(EffectiveStyle {
        font_face: pick(overrides.font_face.as_deref(), &defaults.font_face).to_string(),
        size_normal,
        size_h1: size(&overrides.text_size_heading1, &defaults.text_size_heading1)?,
        size_h2: size(&overrides.text_size_heading2, &defaults.text_size_heading2)?,
        size_h3: size(&overrides.text_size_heading3, &defaults.text_size_heading3)?,
        align: overrides.text_align.unwrap_or(defaults.text_align),
        line_spacing,
        paragraph_spacing: to_mm(pick(
            overrides.paragraph_spacing.as_deref(),
            &defaults.paragraph_spacing,
        ))?,
    })
}

/// The document defaults with no block overrides applied.
pub fn document_style(defaults: &Typography) -> Result<EffectiveStyle> {
    resolve_style(defaults, &StyleOverrides::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn defaults_resolve_to_numbers() {
        let s = document_style(&Typography::default()).unwrap();
        assert_eq!(s.font_face, "Helvetica");
        assert!(close(s.size_normal, 11.0));
        assert!(close(s.size_h1, 16.0));
        assert!(close(s.size_h2, 14.0));
        assert!(close(s.size_h3, 12.0));
        assert_eq!(s.align, TextAlign::Left);
        assert!(close(s.line_spacing, 7.0));
        assert!(close(s.paragraph_spacing, 11.0));
    }

    #[test]
    fn each_attribute_overrides_independently() {
        let defaults = Typography::default();
        let base = document_style(&defaults).unwrap();

        let cases: Vec<(StyleOverrides, Box<dyn Fn(&EffectiveStyle) -> bool>)> = vec![
            (
                StyleOverrides { font_face: Some("Times".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| s.font_face == "Times"),
            ),
            (
                StyleOverrides { text_size_normal: Some("12pt".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| close(s.size_normal, 12.0)),
            ),
            (
                StyleOverrides { text_size_heading1: Some("20pt".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| close(s.size_h1, 20.0)),
            ),
            (
                StyleOverrides { text_size_heading2: Some("18pt".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| close(s.size_h2, 18.0)),
            ),
            (
                StyleOverrides { text_size_heading3: Some("13pt".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| close(s.size_h3, 13.0)),
            ),
            (
                StyleOverrides { text_align: Some(TextAlign::Center), ..Default::default() },
                Box::new(|s: &EffectiveStyle| s.align == TextAlign::Center),
            ),
            (
                StyleOverrides { line_spacing: Some("9mm".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| close(s.line_spacing, 9.0)),
            ),
            (
                StyleOverrides { paragraph_spacing: Some("5mm".into()), ..Default::default() },
                Box::new(|s: &EffectiveStyle| close(s.paragraph_spacing, 5.0)),
            ),
        ];

        for (overrides, check) in cases {
            let resolved = resolve_style(&defaults, &overrides).unwrap();
            assert!(check(&resolved), "override not applied: {overrides:?}");
            // Every other attribute still matches the document default.
            let mut expected = base.clone();
            if overrides.font_face.is_some() {
                expected.font_face = resolved.font_face.clone();
            }
            if overrides.text_size_normal.is_some() {
                expected.size_normal = resolved.size_normal;
            }
            if overrides.text_size_heading1.is_some() {
                expected.size_h1 = resolved.size_h1;
            }
            if overrides.text_size_heading2.is_some() {
                expected.size_h2 = resolved.size_h2;
            }
            if overrides.text_size_heading3.is_some() {
                expected.size_h3 = resolved.size_h3;
            }
            if overrides.text_align.is_some() {
                expected.align = resolved.align;
            }
            if overrides.line_spacing.is_some() {
                expected.line_spacing = resolved.line_spacing;
            }
            if overrides.paragraph_spacing.is_some() {
                expected.paragraph_spacing = resolved.paragraph_spacing;
            }
            assert_eq!(resolved, expected);
        }
    }

    #[test]
    fn empty_override_inherits() {
        let overrides = StyleOverrides {
            font_face: Some("   ".into()),
            line_spacing: Some(String::new()),
            ..Default::default()
        };
        let s = resolve_style(&Typography::default(), &overrides).unwrap();
        assert_eq!(s.font_face, "Helvetica");
        assert!(close(s.line_spacing, 7.0));
    }

    #[test]
    fn missing_line_spacing_uses_font_size() {
        let defaults = Typography {
            line_spacing: String::new(),
            ..Typography::default()
        };
        let s = document_style(&defaults).unwrap();
        assert!(close(s.line_spacing, 5.82));
    }

    #[test]
    fn heading_size_fallback() {
        let s = document_style(&Typography::default()).unwrap();
        assert_eq!(s.heading_size(1), s.size_h1);
        assert_eq!(s.heading_size(3), s.size_h3);
        assert_eq!(s.heading_size(4), s.size_h2);
        assert_eq!(s.heading_size(6), s.size_h2);
    }

    #[test]
    fn bad_size_is_an_error() {
        let overrides = StyleOverrides {
            text_size_normal: Some("big".into()),
            ..Default::default()
        };
        assert!(resolve_style(&Typography::default(), &overrides).is_err());
    }
}
