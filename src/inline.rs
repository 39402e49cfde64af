//! Inline emphasis – splits text into bold / italic runs.
//!
//! `**x**` and `__x__` are bold, `*x*` and `_x_` italic, `***x***` both.
//! Markers without a matching closer are kept as literal text. Underscore
//! markers only open at the start of a word so `snake_case` stays intact.

/// A piece of text drawn with a single font variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }
}

/// Parse emphasis markers into runs. Adjacent runs with the same style are
/// merged.
pub fn parse_runs(text: &str) -> Vec<Run> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs = Vec::new();
    parse_into(&chars, false, false, &mut runs);
    merge(runs)
}

/// Emphasis-free text, used where only plain strings can be drawn.
pub fn strip_emphasis(text: &str) -> String {
    parse_runs(text).into_iter().map(|r| r.text).collect()
}

fn parse_into(chars: &[char], bold: bool, italic: bool, out: &mut Vec<Run>) {
    let mut plain = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() && matches!(chars[i + 1], '*' | '_' | '\\') {
            plain.push(chars[i + 1]);
            i += 2;
            continue;
        }

        if (c == '*' || c == '_') && can_open(chars, i) {
            let run_len = chars[i..].iter().take_while(|&&ch| ch == c).count().min(3);
            if let Some(close) = find_closer(chars, i + run_len, c, run_len) {
                let inner = &chars[i + run_len..close];
                if !inner.is_empty() && !inner[0].is_whitespace() {
                    if !plain.is_empty() {
                        out.push(Run {
                            text: std::mem::take(&mut plain),
                            bold,
                            italic,
                        });
                    }
                    let (b, it) = match run_len {
                        1 => (bold, true),
                        2 => (true, italic),
                        _ => (true, true),
                    };
                    parse_into(inner, b, it, out);
                    i = close + run_len;
                    continue;
                }
            }
            // No closer: the whole marker run is literal.
            for _ in 0..run_len {
                plain.push(c);
            }
            i += run_len;
            continue;
        }

        plain.push(c);
        i += 1;
    }

    if !plain.is_empty() {
        out.push(Run {
            text: plain,
            bold,
            italic,
        });
    }
}

/// `_` only opens at a word start; `*` opens anywhere.
fn can_open(chars: &[char], i: usize) -> bool {
    chars[i] == '*' || i == 0 || !chars[i - 1].is_alphanumeric()
}

/// Index of a closing marker run of exactly `len` copies of `marker`,
/// skipping runs of other lengths (nested emphasis).
fn find_closer(chars: &[char], from: usize, marker: char, len: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        if chars[j] == '\\' {
            j += 2;
            continue;
        }
        if chars[j] == marker {
            let run = chars[j..].iter().take_while(|&&ch| ch == marker).count();
            let closes_word = marker == '*'
                || chars
                    .get(j + run)
                    .map_or(true, |next| !next.is_alphanumeric());
            if run == len && j > from && !chars[j - 1].is_whitespace() && closes_word {
                return Some(j);
            }
            j += run;
            continue;
        }
        j += 1;
    }
    None
}

fn merge(runs: Vec<Run>) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(last) if last.bold == run.bold && last.italic == run.italic => {
                last.text.push_str(&run.text);
            }
            _ => merged.push(run),
        }
    }
    merged
}
