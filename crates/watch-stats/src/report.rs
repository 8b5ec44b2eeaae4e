//! Plain-text report for `--view report`.

use unicode_width::UnicodeWidthStr;

use stats_core::formatting::{format_number, format_share};
use stats_core::models::{Category, CategoryView};
use stats_data::analysis::AnalysisResult;
use stats_data::summary::{channel_listing, channel_rows, SortDirection, SortField, StatsSummary};
use stats_ui::table_view::{truncate_to_width, NAME_WIDTH};

/// What the ranking section lists and how.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub view: CategoryView,
    pub search: String,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    /// Maximum number of ranking rows; `0` lists every channel.
    pub top: usize,
}

fn pad_to_width(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(padding))
}

fn stat_line(label: &str, value: &str) -> String {
    format!("{}{}", pad_to_width(label, 18), value)
}

/// Render the full report as a string ending in a newline.
pub fn render_report(
    analysis: &AnalysisResult,
    summary: &StatsSummary,
    options: &ReportOptions,
) -> String {
    let mut lines: Vec<String> = vec![
        "YouTube Watch Stats".to_string(),
        "=".repeat(60),
    ];

    if summary.is_empty() {
        lines.push("No watch history found.".to_string());
        lines.extend(source_lines(analysis));
        return lines.join("\n") + "\n";
    }

    lines.push(stat_line("Total watched:", &format_number(summary.total_events as f64, 0)));
    lines.push(stat_line("Estimated time:", &summary.total_duration_label));
    lines.push(stat_line("Channels:", &format_number(summary.total_channels as f64, 0)));
    match (&summary.account_age, &summary.since_label) {
        (Some(age), Some(since)) => {
            lines.push(stat_line("History:", &format!("{} ({})", age, since)));
        }
        _ => lines.push(stat_line("History:", "less than a day")),
    }
    if let Some(latest) = &summary.latest_label {
        lines.push(stat_line("Latest watch:", latest));
    }

    for category in Category::ALL {
        let card = summary.card(category);
        lines.push(String::new());
        lines.push(category.title().to_string());
        lines.push("-".repeat(60));
        lines.push(stat_line(
            "  Watched:",
            &format!("{} {}", format_number(card.event_count as f64, 0), category.item_label()),
        ));
        lines.push(stat_line("  Estimated time:", &card.duration_label));
        lines.push(stat_line(
            "  Channels:",
            &format_number(card.channel_count as f64, 0),
        ));
        let top = match &card.top_channel {
            Some(top) => format!(
                "{} ({})",
                top.name,
                format_share(top.watch_count, card.event_count)
            ),
            None => "--".to_string(),
        };
        lines.push(stat_line("  Top channel:", &top));
    }

    lines.push(String::new());
    lines.extend(ranking_lines(analysis, options));
    lines.push(String::new());
    lines.extend(source_lines(analysis));

    lines.join("\n") + "\n"
}

fn ranking_lines(analysis: &AnalysisResult, options: &ReportOptions) -> Vec<String> {
    let listing = channel_listing(
        &analysis.result,
        options.view,
        &options.search,
        options.sort_field,
        options.sort_direction,
    );
    let matched = listing.len();
    let shown = if options.top == 0 {
        &listing[..]
    } else {
        &listing[..matched.min(options.top)]
    };
    let rows = channel_rows(shown, analysis.result.events_for(options.view));

    let mut title = format!(
        "Channels ({}, by {} {})",
        options.view.as_str(),
        options.sort_field.label(),
        options.sort_direction.arrow()
    );
    if !options.search.trim().is_empty() {
        title.push_str(&format!(" matching \"{}\"", options.search.trim()));
    }

    let mut lines = vec![
        title,
        "-".repeat(NAME_WIDTH + 42),
        format!(
            "{:>5}  {}{:>10}  {:>14}  {:>8}",
            "#",
            pad_to_width("Channel", NAME_WIDTH),
            "Watches",
            "Est. time",
            "Share"
        ),
    ];
    if rows.is_empty() {
        lines.push("  (no matching channels)".to_string());
        return lines;
    }
    for row in &rows {
        lines.push(format!(
            "{:>5}  {}{:>10}  {:>14}  {:>7.1}%",
            row.rank,
            pad_to_width(&truncate_to_width(&row.name, NAME_WIDTH), NAME_WIDTH),
            format_number(row.watch_count as f64, 0),
            row.duration_label,
            row.share
        ));
    }
    if shown.len() < matched {
        lines.push(format!("  … {} more", matched - shown.len()));
    }
    lines
}

fn source_lines(analysis: &AnalysisResult) -> Vec<String> {
    let meta = &analysis.metadata;
    vec![format!(
        "Read {} records from {} file(s): {} skipped, {} duplicates, {} not counted.",
        format_number(meta.records_read as f64, 0),
        meta.files_read,
        meta.records_skipped,
        meta.duplicates_removed,
        meta.rejected()
    )]
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;
    use stats_core::models::{Attribution, WatchEvent};
    use stats_data::analysis::{analyze_events, AnalysisOptions};

    fn watch(title: &str, url: &str, channel: &str, ts: &str) -> WatchEvent {
        WatchEvent {
            source: "YouTube".to_string(),
            action_label: format!("Watched {}", title),
            target_url: Some(url.to_string()),
            timestamp: Some(ts.to_string()),
            attribution: Some(vec![Attribution {
                name: channel.to_string(),
                url: format!("https://www.youtube.com/@{}", channel.to_lowercase()),
                avatar: None,
            }]),
            explicit_category: None,
        }
    }

    fn sample() -> AnalysisResult {
        let events = vec![
            watch("a", "https://www.youtube.com/watch?v=a", "Alpha", "2023-01-01T10:00:00Z"),
            watch("b", "https://www.youtube.com/watch?v=b", "Alpha", "2023-06-01T10:00:00Z"),
            watch("c", "https://www.youtube.com/watch?v=c", "Beta", "2024-01-01T10:00:00Z"),
            watch("s", "https://www.youtube.com/shorts/s1", "Gamma", "2024-01-02T10:00:00Z"),
        ];
        analyze_events(&events, &AnalysisOptions::default()).expect("analysis")
    }

    fn options(top: usize, search: &str) -> ReportOptions {
        ReportOptions {
            view: CategoryView::All,
            search: search.to_string(),
            sort_field: SortField::WatchCount,
            sort_direction: SortDirection::Descending,
            top,
        }
    }

    fn summary_of(analysis: &AnalysisResult) -> StatsSummary {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        StatsSummary::build(&analysis.result, now, Tz::UTC)
    }

    #[test]
    fn test_report_headline_and_categories() {
        let analysis = sample();
        let text = render_report(&analysis, &summary_of(&analysis), &options(25, ""));

        assert!(text.starts_with("YouTube Watch Stats\n"));
        assert!(text.contains("Total watched:    4"));
        assert!(text.contains("Since January 1, 2023"));
        assert!(text.contains("Videos"));
        assert!(text.contains("Shorts"));
        assert!(text.contains("Alpha (66.7%)"));
        assert!(text.contains("Gamma (100.0%)"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_report_top_limits_rows() {
        let analysis = sample();
        let text = render_report(&analysis, &summary_of(&analysis), &options(1, ""));
        let ranking: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("Channels ("))
            .collect();
        assert!(ranking.iter().any(|l| l.contains("Alpha")));
        assert!(!ranking.iter().any(|l| l.contains("Beta")));
        assert!(ranking.iter().any(|l| l.contains("… 2 more")));
    }

    #[test]
    fn test_report_search_filters_ranking() {
        let analysis = sample();
        let text = render_report(&analysis, &summary_of(&analysis), &options(0, "gam"));
        assert!(text.contains("matching \"gam\""));
        let ranking: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("Channels ("))
            .collect();
        assert!(ranking.iter().any(|l| l.contains("Gamma")));
        assert!(!ranking.iter().any(|l| l.contains("Alpha")));
    }

    #[test]
    fn test_report_no_matches() {
        let analysis = sample();
        let text = render_report(&analysis, &summary_of(&analysis), &options(0, "zzz"));
        assert!(text.contains("(no matching channels)"));
    }

    #[test]
    fn test_report_empty_history() {
        let analysis = analyze_events(&[], &AnalysisOptions::default()).expect("analysis");
        let text = render_report(&analysis, &summary_of(&analysis), &options(25, ""));
        assert!(text.contains("No watch history found."));
        assert!(!text.contains("Channels ("));
    }
}
