//! Pagination rules – the page-break predicate, per-page bottom margins and
//! the height estimate used before a token is drawn.

use serde::{Deserialize, Serialize};

/// Height of the Canada wordmark on page 1, in mm.
pub const WORDMARK_HEIGHT: f32 = 7.5;
/// Distance from the bottom edge of the page to the bottom of the wordmark.
pub const WORDMARK_BOTTOM_OFFSET: f32 = 13.0;
/// Clear space kept above the wordmark, as a multiple of its height.
pub const WORDMARK_CLEARANCE: f32 = 1.5;
/// Lines assumed for a token whose height is not measured up front.
pub const ESTIMATED_LINES: f32 = 3.0;

/// How the height of a token is estimated before the break decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageBreakEstimate {
    /// `line_spacing × 3` for every token. Exact for short tokens, low for
    /// long paragraphs.
    #[default]
    Heuristic,
    /// Wrap first, then use the real line count.
    Measured,
}

/// `true` when content of `height` starting at `cursor_y` would cross the
/// bottom margin. Content ending exactly on the boundary still fits.
pub fn should_break_page(cursor_y: f32, height: f32, page_height: f32, bottom_margin: f32) -> bool {
    cursor_y + height > page_height - bottom_margin
}

/// Bottom margin in force on `page`. Page 1 keeps clear space above the
/// wordmark when one was placed.
pub fn effective_bottom_margin(page: usize, bottom_margin: f32, wordmark_placed: bool) -> f32 {
    if page == 1 && wordmark_placed {
        bottom_margin.max(WORDMARK_HEIGHT * WORDMARK_CLEARANCE + WORDMARK_BOTTOM_OFFSET)
    } else {
        bottom_margin
    }
}

/// Height estimate for a token, given its wrapped line count when known.
pub fn estimate_height(mode: PageBreakEstimate, line_spacing: f32, measured_lines: Option<usize>) -> f32 {
    match (mode, measured_lines) {
        (PageBreakEstimate::Measured, Some(lines)) => lines.max(1) as f32 * line_spacing,
        _ => line_spacing * ESTIMATED_LINES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn break_boundary_is_strict() {
        // 246.4 + 20 = 266.4 = 279.4 - 13
        assert!(!should_break_page(246.4, 20.0, 279.4, 13.0));
        // 250 + 20 = 270 > 266.4
        assert!(should_break_page(250.0, 20.0, 279.4, 13.0));
        assert!(!should_break_page(200.0, 50.0, 279.4, 13.0));
    }

    #[test]
    fn break_at_top_of_page() {
        assert!(!should_break_page(13.0, 240.0, 279.4, 13.0));
        assert!(should_break_page(13.0, 260.0, 279.4, 13.0));
    }

    #[test]
    fn wordmark_widens_first_page_only() {
        let widened = WORDMARK_HEIGHT * WORDMARK_CLEARANCE + WORDMARK_BOTTOM_OFFSET;
        assert_eq!(effective_bottom_margin(1, 13.0, true), widened);
        assert_eq!(effective_bottom_margin(2, 13.0, true), 13.0);
        assert_eq!(effective_bottom_margin(1, 13.0, false), 13.0);
        assert_eq!(effective_bottom_margin(1, 40.0, true), 40.0);
    }

    #[test]
    fn estimates() {
        assert_eq!(estimate_height(PageBreakEstimate::Heuristic, 7.0, Some(10)), 21.0);
        assert_eq!(estimate_height(PageBreakEstimate::Measured, 7.0, Some(10)), 70.0);
        assert_eq!(estimate_height(PageBreakEstimate::Measured, 7.0, None), 21.0);
    }
}
