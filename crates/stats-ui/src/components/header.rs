use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Play markers placed either side of the application title.
pub const MARKERS: &str = "▶ ▷ ▶";

/// Dashboard header rendering four lines:
///
/// 1. Application title between play markers (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Category view and timezone in `[ category | timezone ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    /// Active category view name (e.g. "all", "short-form").
    pub category: &'a str,
    /// IANA timezone dates are shown in.
    pub timezone: &'a str,
    /// Theme providing colour styles for each part of the header.
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(category: &'a str, timezone: &'a str, theme: &'a Theme) -> Self {
        Self {
            category,
            timezone,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(MARKERS, self.theme.header_accent),
                Span::styled(" YOUTUBE WATCH STATS ", self.theme.header),
                Span::styled(MARKERS, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.category.to_lowercase(), self.theme.value),
                Span::styled(" | ", self.theme.label),
                Span::styled(self.timezone.to_lowercase(), self.theme.value),
                Span::styled(" ]", self.theme.label),
            ]),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_header_to_lines_count() {
        let theme = Theme::dark();
        let lines = Header::new("all", "UTC", &theme).to_lines();
        assert_eq!(lines.len(), 4, "header must produce exactly 4 lines");
        assert!(text(&lines[3]).is_empty());
    }

    #[test]
    fn test_header_title_line_content() {
        let theme = Theme::dark();
        let lines = Header::new("all", "UTC", &theme).to_lines();
        let title = text(&lines[0]);
        assert!(title.contains("YOUTUBE WATCH STATS"), "got: {title}");
        assert!(title.starts_with(MARKERS), "got: {title}");
    }

    #[test]
    fn test_header_info_line() {
        let theme = Theme::dark();
        let lines = Header::new("Short-Form", "America/New_York", &theme).to_lines();
        let info = text(&lines[2]);
        assert_eq!(info, "[ short-form | america/new_york ]");
        assert_eq!(lines[2].spans.len(), 5);
    }

    #[test]
    fn test_header_separator_line() {
        let theme = Theme::dark();
        let lines = Header::new("all", "Europe/London", &theme).to_lines();
        let sep = text(&lines[1]);
        assert_eq!(sep.chars().count(), 60);
        assert!(sep.chars().all(|c| c == '='));
    }
}
