//! Main application state and TUI event loop for watch-stats.
//!
//! [`App`] owns the theme, the aggregate snapshot and the interactive state
//! of the channel listing (category, search, ordering, scroll position).

use std::io;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};

use stats_core::models::{AggregateResult, CategoryView};
use stats_data::summary::{
    channel_listing, channel_rows, ChannelRow, SortDirection, SortField, StatsSummary,
};

use crate::overview_view;
use crate::table_view::{self, SortState, TableTotals};
use crate::themes::Theme;

// ── ViewMode ──────────────────────────────────────────────────────────────────

/// Which screen the TUI is currently rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Headline figures and per-category cards.
    Overview,
    /// Scrollable channel ranking table.
    Channels,
}

impl ViewMode {
    /// Parse a CLI / persisted name. Anything but `"channels"` is the
    /// overview.
    pub fn from_name(name: &str) -> Self {
        match name {
            "channels" => Self::Channels,
            _ => Self::Overview,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Overview => Self::Channels,
            Self::Channels => Self::Overview,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the watch-stats TUI.
pub struct App {
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// IANA timezone dates are shown in.
    pub timezone: String,
    pub category: CategoryView,
    /// Case-insensitive channel-name filter for the table.
    pub search: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// Index of the first visible table row.
    pub scroll: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
    result: AggregateResult,
    summary: StatsSummary,
}

impl App {
    /// Construct an application over a finished aggregate.
    pub fn new(
        theme_name: &str,
        view_mode: ViewMode,
        timezone: String,
        result: AggregateResult,
    ) -> Self {
        let tz: Tz = timezone.parse().unwrap_or(Tz::UTC);
        let summary = StatsSummary::build(&result, Utc::now(), tz);
        Self {
            theme: Theme::from_name(theme_name),
            view_mode,
            timezone,
            category: CategoryView::All,
            search: String::new(),
            sort_field: SortField::default(),
            sort_direction: SortField::default().natural_direction(),
            scroll: 0,
            should_quit: false,
            result,
            summary,
        }
    }

    /// Initial category, search and ordering for the channel listing.
    pub fn with_listing(
        mut self,
        category: CategoryView,
        search: Option<String>,
        sort_field: SortField,
        sort_direction: SortDirection,
    ) -> Self {
        self.category = category;
        self.search = search.unwrap_or_default();
        self.sort_field = sort_field;
        self.sort_direction = sort_direction;
        self
    }

    pub fn summary(&self) -> &StatsSummary {
        &self.summary
    }

    /// Formatted rows of the channel table in its current state.
    pub fn rows(&self) -> Vec<ChannelRow> {
        let listing = channel_listing(
            &self.result,
            self.category,
            &self.search,
            self.sort_field,
            self.sort_direction,
        );
        channel_rows(&listing, self.result.events_for(self.category))
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until the user quits.
    ///
    /// Blocks the calling thread, polling `crossterm` events with a 250 ms
    /// timeout. In raw mode Ctrl+C arrives as a key event, so the loop exits
    /// on `q`, `Q`, `Esc` or `Ctrl+C`.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }

            if self.should_quit {
                break Ok(());
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    /// Apply one key press to the state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.view_mode = self.view_mode.toggled();
                self.scroll = 0;
            }
            KeyCode::Char('c') => {
                self.category = self.category.next();
                self.scroll = 0;
            }
            KeyCode::Char('s') => {
                self.sort_field = self.sort_field.next();
                self.sort_direction = self.sort_field.natural_direction();
                self.scroll = 0;
            }
            KeyCode::Char('r') => {
                self.sort_direction = self.sort_direction.toggled();
                self.scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(10),
            KeyCode::PageUp => self.scroll_by(-10),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            _ => {}
        }
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Move the table window, clamped so the last row stays reachable.
    fn scroll_by(&mut self, delta: isize) {
        if self.view_mode != ViewMode::Channels {
            return;
        }
        let max = channel_listing(
            &self.result,
            self.category,
            &self.search,
            self.sort_field,
            self.sort_direction,
        )
        .len()
        .saturating_sub(1);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    fn table_title(&self) -> String {
        let base = match self.category {
            CategoryView::All => "All channels".to_string(),
            CategoryView::Only(category) => format!("{} channels", category.title()),
        };
        if self.search.is_empty() {
            base
        } else {
            format!("{} matching \"{}\"", base, self.search)
        }
    }

    /// Render the current application state into `frame`.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        if self.result.is_empty() {
            table_view::render_no_data(frame, area, &self.theme);
            return;
        }

        match self.view_mode {
            ViewMode::Overview => overview_view::render_overview(
                frame,
                area,
                &self.summary,
                self.category,
                &self.timezone,
                &self.theme,
            ),
            ViewMode::Channels => {
                let rows = self.rows();
                let totals = TableTotals::from_rows(&rows, self.result.events_for(self.category));
                let sort = SortState {
                    field: self.sort_field,
                    direction: self.sort_direction,
                };
                table_view::render_channel_table(
                    frame,
                    area,
                    &self.table_title(),
                    &rows,
                    &totals,
                    sort,
                    self.scroll,
                    &self.theme,
                );
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn assert_send<T: Send + 'static>() {}

    #[test]
    fn test_app_can_move_to_a_blocking_thread() {
        assert_send::<App>();
    }
    use stats_core::models::{Category, CategoryStats, ChannelStats};

    fn channel(rank: usize, name: &str, count: u64) -> ChannelStats {
        ChannelStats {
            rank,
            name: name.to_string(),
            url: String::new(),
            avatar_url: None,
            watch_count: count,
            estimated_hours: count as f64 / 6.0,
        }
    }

    fn make_result() -> AggregateResult {
        let long = vec![channel(1, "Alpha", 5), channel(2, "beta", 3), channel(3, "Gamma", 1)];
        let short = vec![channel(1, "Shorts Hub", 20)];
        AggregateResult {
            long_form: CategoryStats {
                category: Category::LongForm,
                event_count: 9,
                estimated_hours: 1.5,
                channel_count: 3,
                channels: long.clone(),
            },
            short_form: CategoryStats {
                category: Category::ShortForm,
                event_count: 20,
                estimated_hours: 20.0 * 0.5 / 60.0,
                channel_count: 1,
                channels: short.clone(),
            },
            all_channels: vec![short[0].clone(), long[0].clone(), long[1].clone(), long[2].clone()],
            total_events: 29,
            total_estimated_hours: 1.5 + 20.0 * 0.5 / 60.0,
            watch_range: None,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_app(view: ViewMode) -> App {
        App::new("dark", view, "UTC".to_string(), make_result())
    }

    // ── ViewMode ──────────────────────────────────────────────────────────────

    #[test]
    fn test_view_mode_from_name_and_toggle() {
        assert_eq!(ViewMode::from_name("channels"), ViewMode::Channels);
        assert_eq!(ViewMode::from_name("overview"), ViewMode::Overview);
        assert_eq!(ViewMode::from_name("report"), ViewMode::Overview);
        assert_eq!(ViewMode::Overview.toggled(), ViewMode::Channels);
    }

    // ── App::new ──────────────────────────────────────────────────────────────

    #[test]
    fn test_app_creation_defaults() {
        let app = make_app(ViewMode::Overview);
        assert_eq!(app.category, CategoryView::All);
        assert_eq!(app.sort_field, SortField::WatchCount);
        assert_eq!(app.sort_direction, SortDirection::Descending);
        assert!(!app.should_quit);
        assert_eq!(app.summary().total_events, 29);
    }

    #[test]
    fn test_app_unknown_timezone_does_not_panic() {
        let app = App::new("neon", ViewMode::Channels, "Mars/Base".to_string(), make_result());
        assert_eq!(app.view_mode, ViewMode::Channels);
    }

    // ── rows ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_rows_follow_category_and_search() {
        let mut app = make_app(ViewMode::Channels);
        assert_eq!(app.rows().len(), 4);
        assert_eq!(app.rows()[0].name, "Shorts Hub");

        app.category = CategoryView::Only(Category::LongForm);
        let rows = app.rows();
        assert_eq!(rows.len(), 3);
        assert!((rows[0].share - 5.0 / 9.0 * 100.0).abs() < 1e-9);

        let app = app.with_listing(
            CategoryView::All,
            Some("A".to_string()),
            SortField::Name,
            SortDirection::Ascending,
        );
        let names: Vec<String> = app.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Alpha", "beta", "Gamma"]);
    }

    // ── handle_key ────────────────────────────────────────────────────────────

    #[test]
    fn test_quit_keys() {
        for code in [KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc] {
            let mut app = make_app(ViewMode::Overview);
            app.handle_key(key(code));
            assert!(app.should_quit);
        }
        let mut app = make_app(ViewMode::Overview);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert_eq!(app.category, CategoryView::All);
    }

    #[test]
    fn test_tab_and_category_keys() {
        let mut app = make_app(ViewMode::Overview);
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.view_mode, ViewMode::Channels);
        app.handle_key(key(KeyCode::Char('c')));
        assert_eq!(app.category, CategoryView::Only(Category::LongForm));
        assert!(!app.should_quit);
    }

    #[test]
    fn test_sort_and_reverse_keys() {
        let mut app = make_app(ViewMode::Channels);
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.sort_field, SortField::EstimatedHours);
        assert_eq!(app.sort_direction, SortDirection::Descending);
        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.sort_field, SortField::Rank);
        assert_eq!(app.sort_direction, SortDirection::Ascending);
        app.handle_key(key(KeyCode::Char('r')));
        assert_eq!(app.sort_direction, SortDirection::Descending);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = make_app(ViewMode::Channels);
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.scroll, 0);
        for _ in 0..10 {
            app.handle_key(key(KeyCode::Char('j')));
        }
        assert_eq!(app.scroll, 3);
        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.scroll, 2);
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_scroll_ignored_on_overview() {
        let mut app = make_app(ViewMode::Overview);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.scroll, 0);
    }

    // ── render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_both_views_does_not_panic() {
        for view in [ViewMode::Overview, ViewMode::Channels] {
            let backend = TestBackend::new(100, 40);
            let mut terminal = Terminal::new(backend).unwrap();
            let app = make_app(view);
            terminal.draw(|frame| app.render(frame)).unwrap();
        }
    }

    #[test]
    fn test_table_title_mentions_search() {
        let app = make_app(ViewMode::Channels).with_listing(
            CategoryView::Only(Category::ShortForm),
            Some("hub".to_string()),
            SortField::WatchCount,
            SortDirection::Descending,
        );
        assert_eq!(app.table_title(), "Shorts channels matching \"hub\"");
    }
}
