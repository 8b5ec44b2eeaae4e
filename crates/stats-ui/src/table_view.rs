//! Channel ranking table for the watch-stats TUI.
//!
//! Renders a bordered [`ratatui::widgets::Table`] with one row per channel
//! plus a highlighted totals row at the bottom.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use stats_core::formatting;
use stats_data::summary::{ChannelRow, SortDirection, SortField};

use crate::themes::Theme;

/// Display columns reserved for the channel name.
pub const NAME_WIDTH: usize = 36;

/// Aggregated totals shown below the visible rows.
#[derive(Debug, Clone, Default)]
pub struct TableTotals {
    /// Channels matching the current search.
    pub channels: usize,
    /// Watches across the matching channels.
    pub watch_count: u64,
    /// Estimated hours across the matching channels.
    pub estimated_hours: f64,
    /// Retained events in the current category view.
    pub total_events: u64,
}

impl TableTotals {
    pub fn from_rows(rows: &[ChannelRow], total_events: u64) -> Self {
        Self {
            channels: rows.len(),
            watch_count: rows.iter().map(|r| r.watch_count).sum(),
            estimated_hours: rows.iter().map(|r| r.estimated_hours).sum(),
            total_events,
        }
    }
}

/// Current ordering, used to mark the sorted column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Shorten `name` to at most `max_width` display columns, ending in `…` when
/// anything was cut.
pub fn truncate_to_width(name: &str, max_width: usize) -> String {
    if name.width() <= max_width {
        return name.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in name.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Render the channel table into `area`, skipping the first `offset` rows.
#[allow(clippy::too_many_arguments)]
pub fn render_channel_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[ChannelRow],
    totals: &TableTotals,
    sort: SortState,
    offset: usize,
    theme: &Theme,
) {
    let columns = [
        (SortField::Rank, "#"),
        (SortField::Name, "Channel"),
        (SortField::WatchCount, "Watches"),
        (SortField::EstimatedHours, "Est. time"),
    ];
    let mut header_cells: Vec<Cell> = columns
        .iter()
        .map(|(field, label)| {
            if *field == sort.field {
                Cell::from(format!("{} {}", label, sort.direction.arrow()))
                    .style(theme.table_sorted)
            } else {
                Cell::from(*label).style(theme.table_header)
            }
        })
        .collect();
    header_cells.push(Cell::from("Share").style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    // Border (2) + header (1) + totals (1).
    let visible = (area.height as usize).saturating_sub(4);

    let data_rows: Vec<Row> = rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, row)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(vec![
                Cell::from(row.rank.to_string()),
                Cell::from(truncate_to_width(&row.name, NAME_WIDTH)),
                Cell::from(formatting::format_number(row.watch_count as f64, 0)),
                Cell::from(row.duration_label.clone()),
                Cell::from(Span::styled(
                    format!("{:.1}%", row.share),
                    theme.share_style(row.share),
                )),
            ])
            .style(style)
        })
        .collect();

    let total_row = Row::new(vec![
        Cell::from("TOTAL").style(theme.table_total),
        Cell::from(format!("{} channels", totals.channels)),
        Cell::from(formatting::format_number(totals.watch_count as f64, 0)),
        Cell::from(formatting::format_duration(totals.estimated_hours)),
        Cell::from(formatting::format_share(
            totals.watch_count,
            totals.total_events,
        )),
    ])
    .style(theme.table_total);

    let mut all_rows = data_rows;
    all_rows.push(total_row);

    let widths = [
        Constraint::Length(6),
        Constraint::Length(NAME_WIDTH as u16 + 2),
        Constraint::Length(10),
        Constraint::Length(14),
        Constraint::Length(8),
    ];

    let table = Table::new(all_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when nothing survived filtering.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No watch history found", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Point watch-stats at a Takeout watch-history.json file.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Watch Stats "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
