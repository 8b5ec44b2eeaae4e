use crate::themes::Theme;
use ratatui::text::{Line, Span};
use stats_core::formatting::{format_number, share_percentage};
use stats_core::models::Category;

/// Configuration controlling visual appearance of a bar.
pub struct BarConfig {
    /// Total width in terminal columns of the bar portion (excluding label).
    pub width: u16,
    /// Character used to fill the completed portion of the bar.
    pub filled_char: char,
    /// Character used to fill the empty portion of the bar.
    pub empty_char: char,
}

impl Default for BarConfig {
    fn default() -> Self {
        Self {
            width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
        }
    }
}

// ── ShareBar ─────────────────────────────────────────────────────────────────

/// Horizontal bar showing one count as a share of a total, e.g. the top
/// channel's share of all watched videos.
///
/// Renders as a coloured fill + empty portion followed by a
/// `" 12.5% (250/2,000)"` label.
pub struct ShareBar<'a> {
    /// Share of the total, in `[0.0, 100.0]`.
    pub percentage: f64,
    pub count: u64,
    pub total: u64,
    pub theme: &'a Theme,
    pub config: BarConfig,
}

impl<'a> ShareBar<'a> {
    pub fn new(count: u64, total: u64, theme: &'a Theme) -> Self {
        Self {
            percentage: share_percentage(count, total).min(100.0),
            count,
            total,
            theme,
            config: BarConfig::default(),
        }
    }

    /// Override the bar width.
    pub fn width(mut self, width: u16) -> Self {
        self.config.width = width;
        self
    }

    pub fn to_line(&self) -> Line<'a> {
        let filled = ((self.percentage / 100.0) * self.config.width as f64) as u16;
        let empty = self.config.width.saturating_sub(filled);

        let filled_str: String =
            std::iter::repeat_n(self.config.filled_char, filled as usize).collect();
        let empty_str: String =
            std::iter::repeat_n(self.config.empty_char, empty as usize).collect();

        let label = format!(
            " {:.1}% ({}/{})",
            self.percentage,
            format_number(self.count as f64, 0),
            format_number(self.total as f64, 0),
        );

        Line::from(vec![
            Span::styled(filled_str, self.theme.share_style(self.percentage)),
            Span::styled(empty_str, self.theme.share_empty),
            Span::styled(label, self.theme.share_label),
        ])
    }
}

// ── CategorySplitBar ─────────────────────────────────────────────────────────

/// Proportional two-colour bar splitting retained events between long-form
/// and short-form, followed by per-category percentage labels.
pub struct CategorySplitBar<'a> {
    pub long_form: u64,
    pub short_form: u64,
    pub theme: &'a Theme,
    pub width: u16,
}

impl<'a> CategorySplitBar<'a> {
    pub fn new(long_form: u64, short_form: u64, theme: &'a Theme) -> Self {
        Self {
            long_form,
            short_form,
            theme,
            width: 40,
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let total = self.long_form + self.short_form;
        let mut spans: Vec<Span<'a>> = Vec::new();

        let parts = [
            (Category::LongForm, self.long_form),
            (Category::ShortForm, self.short_form),
        ];

        for (category, count) in parts {
            let pct = share_percentage(count, total);
            let chars = ((pct / 100.0) * self.width as f64).round() as usize;
            if chars > 0 {
                spans.push(Span::styled(
                    "█".repeat(chars),
                    self.theme.category_style(category),
                ));
            }
        }

        spans.push(Span::raw(" "));

        for (category, count) in parts {
            if count > 0 {
                spans.push(Span::styled(
                    format!("{}: {:.0}% ", category.title(), share_percentage(count, total)),
                    self.theme.category_style(category),
                ));
            }
        }

        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
