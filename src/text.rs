//! Styled text layout – wraps emphasis runs into lines and draws them with
//! left, right, centred or full alignment.
//!
//! Each run keeps its own font; a line is drawn as a sequence of segments at
//! an accumulating x offset.

use crate::inline::Run;
use crate::style::TextAlign;
use crate::writer::DocumentWriter;

/// A piece of a word drawn with one font variant. `width` is in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub width: f32,
}

/// Segments without whitespace between them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Word {
    pub segments: Vec<Segment>,
    pub width: f32,
}

/// One wrapped output line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub words: Vec<Word>,
    /// Natural width including single spaces, in mm.
    pub width: f32,
    /// Last line before a hard break or the end of the text; never stretched.
    pub last: bool,
}

impl Line {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.segments.iter().map(|s| s.text.as_str()).collect::<String>())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Font context shared by every segment of a block of text.
#[derive(Debug, Clone, Copy)]
pub struct TextFont<'a> {
    pub face: &'a str,
    /// Points.
    pub size: f32,
    /// Forces bold on every run (headings).
    pub bold: bool,
}

/// Split runs into hard lines of words, keeping run styles.
fn split_words(runs: &[Run], force_bold: bool) -> Vec<Vec<Vec<(String, bool, bool)>>> {
    let mut hard_lines = vec![Vec::new()];
    let mut word: Vec<(String, bool, bool)> = Vec::new();

    fn flush(word: &mut Vec<(String, bool, bool)>, line: &mut Vec<Vec<(String, bool, bool)>>) {
        if !word.is_empty() {
            line.push(std::mem::take(word));
        }
    }

    for run in runs {
        let bold = run.bold || force_bold;
        for ch in run.text.chars() {
            if ch == '\n' {
                if let Some(line) = hard_lines.last_mut() {
                    flush(&mut word, line);
                }
                hard_lines.push(Vec::new());
            } else if ch.is_whitespace() {
                if let Some(line) = hard_lines.last_mut() {
                    flush(&mut word, line);
                }
            } else {
                match word.last_mut() {
                    Some((text, b, i)) if *b == bold && *i == run.italic => text.push(ch),
                    _ => word.push((ch.to_string(), bold, run.italic)),
                }
            }
        }
    }
    if let Some(line) = hard_lines.last_mut() {
        flush(&mut word, line);
    }
    hard_lines
}

fn space_width<W: DocumentWriter + ?Sized>(writer: &mut W, font: TextFont<'_>) -> f32 {
    writer.set_font(font.face, font.bold, false);
    writer.set_font_size(font.size);
    writer.text_width(" ")
}

/// Wrap styled runs to `max_width` mm. Single newlines are hard breaks.
/// A word wider than the line is kept whole on its own line.
pub fn wrap_runs<W: DocumentWriter + ?Sized>(
    writer: &mut W,
    runs: &[Run],
    font: TextFont<'_>,
    max_width: f32,
) -> Vec<Line> {
    let space = space_width(writer, font);
    let mut lines = Vec::new();

    for hard_line in split_words(runs, font.bold) {
        let mut words: Vec<Word> = Vec::new();
        let mut width = 0.0f32;

        for raw in hard_line {
            let mut word = Word::default();
            for (text, bold, italic) in raw {
                writer.set_font(font.face, bold, italic);
                let w = writer.text_width(&text);
                word.width += w;
                word.segments.push(Segment {
                    text,
                    bold,
                    italic,
                    width: w,
                });
            }

            let candidate = if words.is_empty() {
                word.width
            } else {
                width + space + word.width
            };
            if candidate > max_width && !words.is_empty() {
                lines.push(Line {
                    words: std::mem::take(&mut words),
                    width,
                    last: false,
                });
                width = word.width;
            } else {
                width = candidate;
            }
            words.push(word);
        }

        lines.push(Line {
            words,
            width,
            last: true,
        });
    }

    lines
}

/// Draw wrapped lines; line `i` has its top at `y + i * line_spacing`.
pub fn draw_lines<W: DocumentWriter + ?Sized>(
    writer: &mut W,
    lines: &[Line],
    font: TextFont<'_>,
    x: f32,
    width: f32,
    y: f32,
    line_spacing: f32,
    align: TextAlign,
) {
    let space = space_width(writer, font);

    for (i, line) in lines.iter().enumerate() {
        let line_y = y + i as f32 * line_spacing;
        let mut gap = space;
        let mut cursor_x = match align {
            TextAlign::Left | TextAlign::Full => x,
            TextAlign::Right => x + width - line.width,
            TextAlign::Center => x + (width - line.width) / 2.0,
        };

        if align == TextAlign::Full && !line.last && line.words.len() > 1 {
            let words_width: f32 = line.words.iter().map(|w| w.width).sum();
            gap = (width - words_width) / (line.words.len() - 1) as f32;
            cursor_x = x;
        }

        for word in &line.words {
            for seg in &word.segments {
                writer.set_font(font.face, seg.bold, seg.italic);
                writer.text(&seg.text, cursor_x, line_y);
                cursor_x += seg.width;
            }
            cursor_x += gap;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawItem, PdfCanvas};
    use crate::inline::parse_runs;

    const FONT: TextFont<'static> = TextFont {
        face: "Helvetica",
        size: 10.0,
        bold: false,
    };

    fn canvas() -> PdfCanvas {
        PdfCanvas::new("t", 215.9, 279.4)
    }

    #[test]
    fn wraps_and_marks_last_line() {
        let mut c = canvas();
        // Each char is 5pt ≈ 1.764mm wide.
        let lines = wrap_runs(&mut c, &parse_runs("aaaa bbbb cccc"), FONT, 20.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "aaaa bbbb");
        assert!(!lines[0].last);
        assert_eq!(lines[1].text(), "cccc");
        assert!(lines[1].last);
    }

    #[test]
    fn hard_breaks_end_lines() {
        let mut c = canvas();
        let lines = wrap_runs(&mut c, &parse_runs("Dr. Sarah Chen\nOttawa"), FONT, 200.0);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].last && lines[1].last);
    }

    #[test]
    fn overlong_word_gets_its_own_line() {
        let mut c = canvas();
        let lines = wrap_runs(&mut c, &parse_runs("a supercalifragilistic b"), FONT, 10.0);
        assert_eq!(lines.iter().map(|l| l.text()).collect::<Vec<_>>(), vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn emphasis_segments_keep_fonts() {
        let mut c = canvas();
        let lines = wrap_runs(&mut c, &parse_runs("**Re:** approval"), FONT, 200.0);
        draw_lines(&mut c, &lines, FONT, 10.0, 100.0, 30.0, 7.0, TextAlign::Left);
        let items = &c.document().pages[0].items;
        let fonts: Vec<(String, bool)> = items
            .iter()
            .filter_map(|i| match i {
                DrawItem::Text { text, font, .. } => Some((text.clone(), font.bold)),
                _ => None,
            })
            .collect();
        assert_eq!(fonts, vec![("Re:".to_string(), true), ("approval".to_string(), false)]);
    }

    #[test]
    fn alignment_offsets() {
        let mut c = canvas();
        let lines = wrap_runs(&mut c, &parse_runs("abcd"), FONT, 100.0);
        let w = lines[0].width;

        for (align, expected) in [
            (TextAlign::Left, 10.0),
            (TextAlign::Right, 110.0 - w),
            (TextAlign::Center, 10.0 + (100.0 - w) / 2.0),
            (TextAlign::Full, 10.0),
        ] {
            let mut c = canvas();
            draw_lines(&mut c, &lines, FONT, 10.0, 100.0, 0.0, 7.0, align);
            let x = c.document().texts(1)[0].1;
            assert!((x - expected).abs() < 1e-4, "{align:?}: {x} vs {expected}");
        }
    }

    #[test]
    fn full_justification_stretches_all_but_last() {
        let mut c = canvas();
        let lines = wrap_runs(&mut c, &parse_runs("aa bb cc dd ee ff gg"), FONT, 20.0);
        assert!(lines.len() >= 2);
        draw_lines(&mut c, &lines, FONT, 10.0, 20.0, 0.0, 7.0, TextAlign::Full);

        let texts = c.document().texts(1);
        let first_line: Vec<_> = texts.iter().filter(|t| t.2 == 0.0).collect();
        let last_y = (lines.len() - 1) as f32 * 7.0;
        let last_line: Vec<_> = texts.iter().filter(|t| t.2 == last_y).collect();

        // The stretched line ends exactly at the right edge.
        let (text, x, _) = first_line.last().unwrap();
        let mut m = canvas();
        m.set_font_size(10.0);
        assert!((x + m.text_width(text) - 30.0).abs() < 1e-3);

        // The last line starts at the left edge with normal spacing.
        assert_eq!(last_line[0].1, 10.0);
        if last_line.len() > 1 {
            let space = m.text_width(" ");
            let expected = 10.0 + m.text_width(last_line[0].0) + space;
            assert!((last_line[1].1 - expected).abs() < 1e-3);
        }
    }
}
