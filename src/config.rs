//! Letter configuration and content blocks – the caller-facing input types.
//!
//! Every type deserialises from JSON with defaults for missing fields, so a
//! letter definition only needs the values that differ from the defaults.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};
use crate::geometry::PageType;
use crate::pagination::PageBreakEstimate;
use crate::style::{StyleOverrides, Typography};
use crate::writer::TableStyle;

/// Placeholder replaced by a page number in indicator formats.
pub const PAGE_PLACEHOLDER: char = '#';

/// When a page indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawShowPolicy", into = "RawShowPolicy")]
pub enum ShowPolicy {
    #[default]
    Never,
    Always,
    /// Every page except the first.
    SkipFirst,
}

impl ShowPolicy {
    /// Whether the indicator belongs on `page` (1-based).
    pub fn shows_on(self, page: usize) -> bool {
        match self {
            ShowPolicy::Never => false,
            ShowPolicy::Always => true,
            ShowPolicy::SkipFirst => page > 1,
        }
    }
}

/// `true`, `false` or `"skip-first"`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawShowPolicy {
    Flag(bool),
    Named(String),
}

impl TryFrom<RawShowPolicy> for ShowPolicy {
    type Error = String;

    fn try_from(raw: RawShowPolicy) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawShowPolicy::Flag(true) => Ok(ShowPolicy::Always),
            RawShowPolicy::Flag(false) => Ok(ShowPolicy::Never),
            RawShowPolicy::Named(name) => match name.as_str() {
                "skip-first" | "skip_first" => Ok(ShowPolicy::SkipFirst),
                "always" | "true" => Ok(ShowPolicy::Always),
                "never" | "false" => Ok(ShowPolicy::Never),
                other => Err(format!("unknown show policy {other:?}")),
            },
        }
    }
}

impl From<ShowPolicy> for RawShowPolicy {
    fn from(policy: ShowPolicy) -> Self {
        match policy {
            ShowPolicy::Never => RawShowPolicy::Flag(false),
            ShowPolicy::Always => RawShowPolicy::Flag(true),
            ShowPolicy::SkipFirst => RawShowPolicy::Named("skip-first".to_string()),
        }
    }
}

/// Header or footer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Header,
    Footer,
}

/// Horizontal placement of a header/footer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Unrecognised names resolve to [`Alignment::Left`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "center" | "centre" => Alignment::Center,
            "right" => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

impl<'de> Deserialize<'de> for Alignment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Alignment::from_name(&name))
    }
}

/// Page number settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageNumbers {
    pub show: ShowPolicy,
    /// Format string; `#` is replaced by the page number.
    pub format: String,
    pub location: Location,
    pub alignment: Alignment,
}

impl Default for PageNumbers {
    fn default() -> Self {
        Self {
            show: ShowPolicy::Never,
            format: "-#-".to_string(),
            location: Location::Header,
            alignment: Alignment::Center,
        }
    }
}

/// Continuation indicator ("there is a next page") settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextPage {
    pub show: ShowPolicy,
    /// Format string; `#` is replaced by the next page number.
    pub format: String,
    pub location: Location,
    pub alignment: Alignment,
}

impl Default for NextPage {
    fn default() -> Self {
        Self {
            show: ShowPolicy::Never,
            format: ".../#".to_string(),
            location: Location::Footer,
            alignment: Alignment::Center,
        }
    }
}

/// Tracking number printed on every page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterNumber {
    pub show: bool,
    pub number: Option<String>,
    pub location: Location,
    pub alignment: Alignment,
}

impl Default for LetterNumber {
    fn default() -> Self {
        Self {
            show: false,
            number: None,
            location: Location::Footer,
            alignment: Alignment::Right,
        }
    }
}

impl LetterNumber {
    /// The number to print, when enabled and non-empty.
    pub fn text(&self) -> Option<&str> {
        match self.number.as_deref().map(str::trim) {
            Some(n) if self.show && !n.is_empty() => Some(n),
            _ => None,
        }
    }
}

/// Document-level configuration, fixed for the whole render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterConfig {
    /// Output file name; `.pdf` is appended on save when missing.
    pub file_name: String,
    /// Department signature image source (data URI or path). Required.
    pub dept_signature: String,
    pub page_type: PageType,
    pub x_margin: String,
    pub y_margin: String,
    #[serde(flatten)]
    pub typography: Typography,
    pub page_numbers: PageNumbers,
    pub next_page: NextPage,
    pub letter_number: LetterNumber,
    /// Appended to the PDF title metadata.
    pub letter_version: Option<String>,
    pub show_canada_wordmark: bool,
    /// Canada wordmark image source; the mark is only placed when set.
    pub canada_wordmark: Option<String>,
    pub page_break_estimate: PageBreakEstimate,
    pub table_style: TableStyle,
}

impl Default for LetterConfig {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            dept_signature: String::new(),
            page_type: PageType::Letter,
            x_margin: "38mm".to_string(),
            y_margin: "13mm".to_string(),
            typography: Typography::default(),
            page_numbers: PageNumbers::default(),
            next_page: NextPage::default(),
            letter_number: LetterNumber::default(),
            letter_version: None,
            show_canada_wordmark: true,
            canada_wordmark: None,
            page_break_estimate: PageBreakEstimate::Heuristic,
            table_style: TableStyle::default(),
        }
    }
}

impl LetterConfig {
    pub fn new(file_name: &str, dept_signature: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            dept_signature: dept_signature.to_string(),
            ..Self::default()
        }
    }

    /// Check required values and indicator formats.
    pub fn validate(&self) -> Result<()> {
        if self.file_name.trim().is_empty() {
            return Err(Error::Config("fileName is required".to_string()));
        }
        if self.dept_signature.trim().is_empty() {
            return Err(Error::Config("deptSignature is required".to_string()));
        }
        if !self.page_numbers.format.contains(PAGE_PLACEHOLDER) {
            return Err(Error::Config(
                "pageNumberFormat must contain # as placeholder for page number".to_string(),
            ));
        }
        if !self.next_page.format.contains(PAGE_PLACEHOLDER) {
            return Err(Error::Config(
                "nextPageNumberFormat must contain # as placeholder for page number".to_string(),
            ));
        }
        Ok(())
    }

    /// Title for the PDF metadata.
    pub fn title(&self) -> String {
        match self.letter_version.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => format!("{} (v{})", self.file_name, v),
            _ => self.file_name.clone(),
        }
    }

    /// The wordmark source, when the mark should be placed.
    pub fn wordmark_source(&self) -> Option<&str> {
        match self.canada_wordmark.as_deref().map(str::trim) {
            Some(src) if self.show_canada_wordmark && !src.is_empty() => Some(src),
            _ => None,
        }
    }
}

/// A block of markdown content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBlock {
    pub content: String,
    /// When `false`, the block never starts a new page; content that does not
    /// fit overflows the bottom margin and a warning is recorded.
    pub allow_page_break: bool,
    #[serde(flatten)]
    pub style: StyleOverrides,
}

impl Default for TextBlock {
    fn default() -> Self {
        Self {
            content: String::new(),
            allow_page_break: true,
            style: StyleOverrides::default(),
        }
    }
}

impl TextBlock {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: StyleOverrides) -> Self {
        self.style = style;
        self
    }

    pub fn keep_together(mut self) -> Self {
        self.allow_page_break = false;
        self
    }
}

/// A horizontal rule. Spacing defaults to the document paragraph spacing
/// before and twice that after.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparatorBlock {
    pub spacing_before: Option<String>,
    pub spacing_after: Option<String>,
}

/// One entry in the letter body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(TextBlock),
    Separator(SeparatorBlock),
}

impl ContentBlock {
    pub fn text(content: impl Into<String>) -> Self {
        ContentBlock::Text(TextBlock::new(content))
    }

    pub fn separator() -> Self {
        ContentBlock::Separator(SeparatorBlock::default())
    }
}

impl From<TextBlock> for ContentBlock {
    fn from(block: TextBlock) -> Self {
        ContentBlock::Text(block)
    }
}

impl From<SeparatorBlock> for ContentBlock {
    fn from(block: SeparatorBlock) -> Self {
        ContentBlock::Separator(block)
    }
}

/// A complete letter as read from JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LetterDefinition {
    pub config: LetterConfig,
    pub blocks: Vec<ContentBlock>,
}

impl LetterDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::TextAlign;

    #[test]
    fn required_fields() {
        assert!(matches!(LetterConfig::default().validate(), Err(Error::Config(_))));
        assert!(matches!(LetterConfig::new("  ", "sig.png").validate(), Err(Error::Config(_))));
        assert!(matches!(LetterConfig::new("letter", "").validate(), Err(Error::Config(_))));
        assert!(LetterConfig::new("letter", "sig.png").validate().is_ok());
    }

    #[test]
    fn formats_need_placeholder() {
        let mut config = LetterConfig::new("letter", "sig.png");
        config.page_numbers.format = "Page".to_string();
        assert_eq!(config.page_numbers.show, ShowPolicy::Never);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        config.page_numbers.format = "Page #".to_string();
        assert!(config.validate().is_ok());

        let mut config = LetterConfig::new("letter", "sig.png");
        config.next_page.show = ShowPolicy::SkipFirst;
        config.next_page.format = "more".to_string();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn show_policy_from_json() {
        let p: PageNumbers = serde_json::from_str(r#"{"show": "skip-first"}"#).unwrap();
        assert_eq!(p.show, ShowPolicy::SkipFirst);
        assert_eq!(p.format, "-#-");
        let p: PageNumbers = serde_json::from_str(r#"{"show": true, "alignment": "diagonal"}"#).unwrap();
        assert_eq!(p.show, ShowPolicy::Always);
        assert_eq!(p.alignment, Alignment::Left);
        assert!(serde_json::from_str::<PageNumbers>(r#"{"show": "sometimes"}"#).is_err());
        assert_eq!(serde_json::to_string(&ShowPolicy::SkipFirst).unwrap(), "\"skip-first\"");
    }

    #[test]
    fn policy_pages() {
        assert!(!ShowPolicy::SkipFirst.shows_on(1));
        assert!(ShowPolicy::SkipFirst.shows_on(2));
        assert!(ShowPolicy::Always.shows_on(1));
        assert!(!ShowPolicy::Never.shows_on(3));
    }

    #[test]
    fn letter_definition_from_json() {
        let json = r#"{
            "config": {
                "file_name": "open-source",
                "dept_signature": "sig.png",
                "page_type": "legal",
                "text_align": "full",
                "letter_number": {"show": true, "number": "VAC-2024-003"}
            },
            "blocks": [
                {"type": "text", "content": "Hello", "text_align": "center"},
                {"type": "separator"},
                {"type": "text", "content": "Bye", "allow_page_break": false}
            ]
        }"#;
        let def = LetterDefinition::from_json(json).unwrap();
        assert_eq!(def.config.page_type, PageType::Legal);
        assert_eq!(def.config.typography.text_align, TextAlign::Full);
        assert_eq!(def.config.typography.font_face, "Helvetica");
        assert_eq!(def.config.letter_number.text(), Some("VAC-2024-003"));
        assert_eq!(def.config.x_margin, "38mm");
        assert_eq!(def.blocks.len(), 3);
        match &def.blocks[0] {
            ContentBlock::Text(t) => {
                assert_eq!(t.style.text_align, Some(TextAlign::Center));
                assert!(t.allow_page_break);
            }
            other => panic!("expected text block, got {other:?}"),
        }
        assert_eq!(def.blocks[1], ContentBlock::separator());
        match &def.blocks[2] {
            ContentBlock::Text(t) => assert!(!t.allow_page_break),
            other => panic!("expected text block, got {other:?}"),
        }
    }

    #[test]
    fn title_includes_version() {
        let mut config = LetterConfig::new("letter", "sig.png");
        assert_eq!(config.title(), "letter");
        config.letter_version = Some("2.1".to_string());
        assert_eq!(config.title(), "letter (v2.1)");
    }

    #[test]
    fn wordmark_needs_source_and_toggle() {
        let mut config = LetterConfig::new("letter", "sig.png");
        assert_eq!(config.wordmark_source(), None);
        config.canada_wordmark = Some("mark.png".to_string());
        assert_eq!(config.wordmark_source(), Some("mark.png"));
        config.show_canada_wordmark = false;
        assert_eq!(config.wordmark_source(), None);
    }
}
