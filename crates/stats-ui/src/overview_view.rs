//! Overview screen for the watch-stats TUI.
//!
//! Renders the headline figures: total watches and estimated time, the
//! long-form / short-form split, one card per category with its top channel,
//! and how far back the history goes.

use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use stats_core::formatting::format_number;
use stats_core::models::{Category, CategoryView};
use stats_data::summary::{CategoryCard, StatsSummary};

use crate::components::header::Header;
use crate::components::progress_bar::{CategorySplitBar, ShareBar};
use crate::table_view;
use crate::themes::Theme;

/// Column at which values start after an icon + label.
const LABEL_WIDTH: usize = 22;

// ── Row builders ──────────────────────────────────────────────────────────────

/// Pad an icon + label to [`LABEL_WIDTH`] display columns.
fn pad_label(icon: &str, label: &str) -> String {
    let content = format!("{} {}", icon, label);
    let padding = LABEL_WIDTH.saturating_sub(content.width()).max(1);
    format!("{}{}", content, " ".repeat(padding))
}

fn stat_row<'a>(icon: &str, label: &str, value: String, theme: &'a Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(pad_label(icon, label), theme.label),
        Span::styled(value, theme.value),
    ])
}

fn card_lines<'a>(card: &CategoryCard, theme: &'a Theme) -> Vec<Line<'a>> {
    let accent = theme.category_style(card.category);
    let noun = card.category.item_label();

    let mut lines = vec![
        Line::from(Span::styled(format!("▌ {}", card.category.title()), accent)),
        stat_row(
            "  ▸",
            "Watched:",
            format!("{} {}", format_number(card.event_count as f64, 0), noun),
            theme,
        ),
        Line::from(vec![
            Span::styled(pad_label("  ▸", "Estimated time:"), theme.label),
            Span::styled(card.duration_label.clone(), theme.value),
            Span::styled(
                format!("  (~{} hrs)", format_number(card.approx_hours as f64, 0)),
                theme.dim,
            ),
        ]),
        stat_row(
            "  ▸",
            "Channels:",
            format_number(card.channel_count as f64, 0),
            theme,
        ),
    ];

    match &card.top_channel {
        Some(top) => {
            lines.push(Line::from(vec![
                Span::styled(pad_label("  ▸", "Top channel:"), theme.label),
                Span::styled(top.name.clone(), accent),
            ]));
            let mut bar = ShareBar::new(top.watch_count, card.event_count, theme)
                .to_line()
                .spans;
            bar.insert(0, Span::raw(" ".repeat(LABEL_WIDTH)));
            lines.push(Line::from(bar));
        }
        None => lines.push(Line::from(vec![
            Span::styled(pad_label("  ▸", "Top channel:"), theme.label),
            Span::styled("--", theme.dim),
        ])),
    }

    lines
}

// ── Main render ───────────────────────────────────────────────────────────────

/// Render the overview screen into `area`, or the "no data" placeholder when
/// nothing was retained.
pub fn render_overview(
    frame: &mut Frame,
    area: Rect,
    summary: &StatsSummary,
    view: CategoryView,
    timezone: &str,
    theme: &Theme,
) {
    if summary.is_empty() {
        table_view::render_no_data(frame, area, theme);
        return;
    }
    let lines = build_overview_lines(summary, view, timezone, theme);
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

/// Build the full `Vec<Line>` for the overview (extracted for testability).
pub fn build_overview_lines<'a>(
    summary: &StatsSummary,
    view: CategoryView,
    timezone: &'a str,
    theme: &'a Theme,
) -> Vec<Line<'a>> {
    let mut lines: Vec<Line<'a>> = Vec::with_capacity(32);

    lines.extend(Header::new(view.as_str(), timezone, theme).to_lines());

    // ── Totals ────────────────────────────────────────────────────────────────
    lines.push(stat_row(
        "▶",
        "Total watched:",
        format_number(summary.total_events as f64, 0),
        theme,
    ));
    lines.push(stat_row(
        "◷",
        "Estimated time:",
        summary.total_duration_label.clone(),
        theme,
    ));
    lines.push(stat_row(
        "☰",
        "Channels:",
        format_number(summary.total_channels as f64, 0),
        theme,
    ));

    match (&summary.account_age, &summary.since_label) {
        (Some(age), Some(since)) => {
            lines.push(Line::from(vec![
                Span::styled(pad_label("◴", "History:"), theme.label),
                Span::styled(age.clone(), theme.value),
                Span::styled(format!("  {}", since), theme.dim),
            ]));
        }
        _ => lines.push(Line::from(vec![
            Span::styled(pad_label("◴", "History:"), theme.label),
            Span::styled("less than a day", theme.dim),
        ])),
    }
    lines.push(Line::from(""));

    // ── Category split ────────────────────────────────────────────────────────
    if view == CategoryView::All {
        let mut split = CategorySplitBar::new(
            summary.long_form.event_count,
            summary.short_form.event_count,
            theme,
        )
        .to_line()
        .spans;
        split.insert(0, Span::styled(pad_label("◑", "Split:"), theme.label));
        lines.push(Line::from(split));
        lines.push(Line::from(""));
    }

    // ── Cards ─────────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled("─".repeat(60), theme.separator)));
    let categories: &[Category] = match view {
        CategoryView::All => &Category::ALL,
        CategoryView::Only(Category::LongForm) => &[Category::LongForm],
        CategoryView::Only(Category::ShortForm) => &[Category::ShortForm],
    };
    for category in categories {
        lines.extend(card_lines(summary.card(*category), theme));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled("─".repeat(60), theme.separator)));

    // ── Status bar ────────────────────────────────────────────────────────────
    lines.push(Line::from(Span::styled(
        "Tab: channels | c: category | q: quit",
        theme.dim,
    )));

    lines
}

// ── Tests ──────────────────────────────────────────────────────────────────────
