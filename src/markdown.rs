//! Block tokenizer – turns the markdown-like content of a letter block into
//! an ordered list of [`Token`]s.
//!
//! Supported block syntax:
//! - `#`, `##`, `###` ... headings
//! - `-`, `*`, `+` bullets and `1.` / `1)` numbered items (indented lines
//!   continue the previous item)
//! - GFM pipe tables with a `---` delimiter row
//! - paragraphs; a single newline inside a paragraph is a hard line break
//!
//! One blank line separates blocks. Every additional consecutive blank line
//! yields a [`Token::Space`].

use serde::{Deserialize, Serialize};

/// Column alignment taken from a table delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// One structural unit of block content.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Paragraph(String),
    Heading { level: u8, text: String },
    List { ordered: bool, items: Vec<String> },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        align: Vec<ColumnAlign>,
    },
    Space,
}

/// Parses block content into tokens.
pub trait BlockTokenizer {
    fn tokenize(&self, content: &str) -> Vec<Token>;
}

/// Line-oriented markdown tokenizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownTokenizer;

impl BlockTokenizer for MarkdownTokenizer {
    fn tokenize(&self, content: &str) -> Vec<Token> {
        tokenize(content)
    }
}

/// Tokenize `content` with the default grammar.
pub fn tokenize(content: &str) -> Vec<Token> {
    let lines: Vec<&str> = content.lines().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut blank_run = 0usize;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            blank_run += 1;
            // The first blank line only separates blocks.
            if blank_run > 1 && !tokens.is_empty() {
                tokens.push(Token::Space);
            }
            i += 1;
            continue;
        }
        blank_run = 0;

        if let Some((level, text)) = heading(line) {
            tokens.push(Token::Heading {
                level,
                text: text.to_string(),
            });
            i += 1;
        } else if let Some((ordered, _)) = list_marker(line) {
            let (token, next) = read_list(&lines, i, ordered);
            tokens.push(token);
            i = next;
        } else if i + 1 < lines.len() && is_table_row(line) && is_delimiter_row(lines[i + 1]) {
            let (token, next) = read_table(&lines, i);
            tokens.push(token);
            i = next;
        } else {
            let (token, next) = read_paragraph(&lines, i);
            tokens.push(token);
            i = next;
        }
    }

    // Trailing blank lines carry no meaning.
    while tokens.last() == Some(&Token::Space) {
        tokens.pop();
    }
    tokens
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim().trim_end_matches('#').trim_end();
    Some((hashes as u8, text))
}

/// Returns `(ordered, text)` when the line opens a list item.
fn list_marker(line: &str) -> Option<(bool, &str)> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    for bullet in ["- ", "* ", "+ "] {
        if let Some(text) = trimmed.strip_prefix(bullet) {
            return Some((false, text.trim()));
        }
    }
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &trimmed[digits..];
    let text = rest
        .strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))?;
    Some((true, text.trim()))
}

fn read_list(lines: &[&str], start: usize, ordered: bool) -> (Token, usize) {
    let mut items: Vec<String> = Vec::new();
    let mut i = start;

    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            // A blank line ends the list unless the next item continues it.
            match lines.get(i + 1).and_then(|l| list_marker(l)) {
                Some((o, _)) if o == ordered => {
                    i += 1;
                    continue;
                }
                _ => break,
            }
        }
        match list_marker(line) {
            Some((o, text)) if o == ordered => items.push(text.to_string()),
            Some(_) => break,
            None if line.starts_with(char::is_whitespace) && !items.is_empty() => {
                if let Some(last) = items.last_mut() {
                    last.push(' ');
                    last.push_str(line.trim());
                }
            }
            None => break,
        }
        i += 1;
    }

    (Token::List { ordered, items }, i)
}

fn is_table_row(line: &str) -> bool {
    line.contains('|')
}

fn is_delimiter_row(line: &str) -> bool {
    let cells = split_row(line);
    !cells.is_empty()
        && cells.iter().all(|c| {
            let c = c.trim();
            let inner = c.trim_start_matches(':').trim_end_matches(':');
            !inner.is_empty() && inner.chars().all(|ch| ch == '-')
        })
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(|c| c.trim().to_string()).collect()
}

fn column_align(cell: &str) -> ColumnAlign {
    let c = cell.trim();
    match (c.starts_with(':'), c.ends_with(':')) {
        (true, true) => ColumnAlign::Center,
        (false, true) => ColumnAlign::Right,
        _ => ColumnAlign::Left,
    }
}

fn read_table(lines: &[&str], start: usize) -> (Token, usize) {
    let header = split_row(lines[start]);
    let columns = header.len();
    let mut align: Vec<ColumnAlign> = split_row(lines[start + 1])
        .iter()
        .map(|c| column_align(c))
        .collect();
    align.resize(columns, ColumnAlign::Left);

    let mut rows = Vec::new();
    let mut i = start + 2;
    while i < lines.len() && !lines[i].trim().is_empty() && is_table_row(lines[i]) {
        let mut row = split_row(lines[i]);
        row.resize(columns, String::new());
        rows.push(row);
        i += 1;
    }

    (Token::Table { header, rows, align }, i)
}

fn read_paragraph(lines: &[&str], start: usize) -> (Token, usize) {
    let mut text: Vec<&str> = Vec::new();
    let mut i = start;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            break;
        }
        if i > start
            && (heading(line).is_some()
                || list_marker(line).is_some()
                || (i + 1 < lines.len() && is_table_row(line) && is_delimiter_row(lines[i + 1])))
        {
            break;
        }
        text.push(line.trim());
        i += 1;
    }
    (Token::Paragraph(text.join("\n")), i)
}
