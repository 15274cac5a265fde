//! Context windows around matching lines
use std::borrow::Cow;

pub const ELLIPSIS: char = '…';

/// Truncate a line longer than `max_chars`, keeping a whole-character prefix
/// followed by an ellipsis.
///
/// The byte length is checked first as a cheap approximation of display
/// width; lines under it are returned untouched.
pub fn truncate_line(line: &str, max_chars: usize) -> Cow<'_, str> {
    if line.len() <= max_chars {
        return Cow::Borrowed(line);
    }
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = String::with_capacity(cut + ELLIPSIS.len_utf8());
            truncated.push_str(&line[..cut]);
            truncated.push(ELLIPSIS);
            Cow::Owned(truncated)
        }
        None => Cow::Borrowed(line),
    }
}

/// Lines surrounding `match_index`, clipped to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextWindow {
    /// 0-based index of the first line in the window
    pub start: usize,
    /// 0-based exclusive end; equal to `start` when context is disabled
    pub end: usize,
}

impl ContextWindow {
    /// Window of `context_lines` on each side of `match_index`. Negative
    /// context yields an empty window anchored at the match.
    pub fn around(match_index: usize, context_lines: i32, line_count: usize) -> Self {
        let match_index = match_index.min(line_count.saturating_sub(1));
        if context_lines < 0 {
            return Self {
                start: match_index,
                end: match_index,
            };
        }
        let context = context_lines as usize;
        Self {
            start: match_index.saturating_sub(context),
            end: match_index
                .saturating_add(context)
                .saturating_add(1)
                .min(line_count),
        }
    }

    /// Join the window's lines, truncating each to `max_chars`.
    pub fn text(&self, lines: &[String], max_chars: usize) -> String {
        let end = self.end.min(lines.len());
        let start = self.start.min(end);
        lines[start..end]
            .iter()
            .map(|line| truncate_line(line, max_chars))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Number of lines `later` shares with `self`. Zero means the windows are
    /// exactly adjacent and negative values count the gap between them;
    /// both zero and positive values are mergeable.
    pub fn overlap(&self, later: &ContextWindow) -> isize {
        self.end as isize - later.start as isize
    }

    /// Smallest window covering both. Only meaningful for windows with a
    /// non-negative overlap.
    pub fn union(&self, other: &ContextWindow) -> ContextWindow {
        ContextWindow {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_short_line_untouched() {
        assert!(matches!(truncate_line("short", 500), Cow::Borrowed("short")));
    }

    #[test]
    fn test_long_ascii_line_truncated() {
        let line = "a".repeat(10_000);
        let truncated = truncate_line(&line, 500);
        assert_eq!(truncated.chars().count(), 501);
        assert!(truncated.ends_with(ELLIPSIS));
        assert_eq!(&truncated[..500], &line[..500]);
    }

    #[test]
    fn test_multibyte_never_split() {
        let line = "é".repeat(600);
        let truncated = truncate_line(&line, 500);
        assert_eq!(truncated.chars().count(), 501);
        assert!(truncated.chars().take(500).all(|c| c == 'é'));
    }

    #[test]
    fn test_multibyte_under_char_limit_kept() {
        // 300 chars but 600 bytes
        let line = "é".repeat(300);
        assert_eq!(truncate_line(&line, 500), line);
    }

    #[test]
    fn test_window_clipped_to_file() {
        assert_eq!(
            ContextWindow::around(0, 2, 10),
            ContextWindow { start: 0, end: 3 }
        );
        assert_eq!(
            ContextWindow::around(9, 2, 10),
            ContextWindow { start: 7, end: 10 }
        );
        assert_eq!(
            ContextWindow::around(5, 1, 10),
            ContextWindow { start: 4, end: 7 }
        );
    }

    #[test]
    fn test_negative_context_is_empty() {
        let window = ContextWindow::around(5, -1, 10);
        assert!(window.is_empty());
        assert_eq!(window.start, 5);
        assert_eq!(window.text(&lines(10), 500), "");
    }

    #[test]
    fn test_overlap() {
        let a = ContextWindow { start: 3, end: 6 };
        assert_eq!(a.overlap(&ContextWindow { start: 5, end: 8 }), 1);
        assert_eq!(a.overlap(&ContextWindow { start: 6, end: 7 }), 0);
        assert_eq!(a.overlap(&ContextWindow { start: 8, end: 9 }), -2);
        assert_eq!(
            a.union(&ContextWindow { start: 5, end: 8 }),
            ContextWindow { start: 3, end: 8 }
        );
        // a window inside `a` leaves it unchanged
        assert_eq!(a.union(&ContextWindow { start: 4, end: 5 }), a);
    }

    #[test]
    fn test_window_text() {
        let window = ContextWindow::around(1, 1, 3);
        assert_eq!(window.text(&lines(3), 500), "line 1\nline 2\nline 3");
    }
}
