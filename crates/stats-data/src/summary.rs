//! Presentation-ready views over an [`AggregateResult`].
//!
//! Nothing here re-aggregates; every figure is derived from the snapshot.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use stats_core::formatting::{format_duration, share_percentage};
use stats_core::models::{AggregateResult, Category, CategoryStats, CategoryView, ChannelStats};
use stats_core::time_utils::{elapsed_since, format_long_date};

// ── Sorting ───────────────────────────────────────────────────────────────────

/// Column a channel listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Rank,
    Name,
    #[default]
    WatchCount,
    EstimatedHours,
}

impl SortField {
    /// Parse a CLI / persisted name. Unknown names fall back to
    /// [`SortField::WatchCount`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "rank" => Self::Rank,
            "name" => Self::Name,
            "estimated_hours" => Self::EstimatedHours,
            _ => Self::WatchCount,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rank => "rank",
            Self::Name => "name",
            Self::WatchCount => "watch_count",
            Self::EstimatedHours => "estimated_hours",
        }
    }

    /// Column label for table headers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Rank => "Rank",
            Self::Name => "Channel",
            Self::WatchCount => "Watches",
            Self::EstimatedHours => "Est. time",
        }
    }

    /// Cycle through the fields in column order.
    pub fn next(self) -> Self {
        match self {
            Self::Rank => Self::Name,
            Self::Name => Self::WatchCount,
            Self::WatchCount => Self::EstimatedHours,
            Self::EstimatedHours => Self::Rank,
        }
    }

    /// Direction a field sorts in before the user reverses it: counts and
    /// hours largest first, rank and name alphabetical/ascending.
    pub fn natural_direction(self) -> SortDirection {
        match self {
            Self::Rank | Self::Name => SortDirection::Ascending,
            Self::WatchCount | Self::EstimatedHours => SortDirection::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// Case-insensitive substring match on channel name. A blank query keeps
/// everything.
pub fn filter_channels<'a>(channels: &'a [ChannelStats], query: &str) -> Vec<&'a ChannelStats> {
    let needle = query.trim().to_lowercase();
    channels
        .iter()
        .filter(|c| needle.is_empty() || c.name.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort by `field`. Equal keys keep their current relative order in
/// both directions.
pub fn sort_channels(channels: &mut [&ChannelStats], field: SortField, direction: SortDirection) {
    channels.sort_by(|a, b| {
        let ordering = compare_by(a, b, field);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

/// Filter and order the ranking for `view`.
pub fn channel_listing<'a>(
    result: &'a AggregateResult,
    view: CategoryView,
    query: &str,
    field: SortField,
    direction: SortDirection,
) -> Vec<&'a ChannelStats> {
    let mut listing = filter_channels(result.channels_for(view), query);
    sort_channels(&mut listing, field, direction);
    listing
}

fn compare_by(a: &ChannelStats, b: &ChannelStats, field: SortField) -> Ordering {
    match field {
        SortField::Rank => a.rank.cmp(&b.rank),
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortField::WatchCount => a.watch_count.cmp(&b.watch_count),
        SortField::EstimatedHours => a.estimated_hours.total_cmp(&b.estimated_hours),
    }
}

// ── Table rows ────────────────────────────────────────────────────────────────

/// One formatted line of a channel table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelRow {
    pub rank: usize,
    pub name: String,
    pub url: String,
    pub watch_count: u64,
    pub estimated_hours: f64,
    /// `format_duration(estimated_hours)`.
    pub duration_label: String,
    /// Share of `total_events`, in percent.
    pub share: f64,
}

/// Format `channels` as table rows, shares taken against `total_events`.
pub fn channel_rows(channels: &[&ChannelStats], total_events: u64) -> Vec<ChannelRow> {
    channels
        .iter()
        .map(|c| ChannelRow {
            rank: c.rank,
            name: c.name.clone(),
            url: c.url.clone(),
            watch_count: c.watch_count,
            estimated_hours: c.estimated_hours,
            duration_label: format_duration(c.estimated_hours),
            share: share_percentage(c.watch_count, total_events),
        })
        .collect()
}

// ── StatsSummary ──────────────────────────────────────────────────────────────

/// The most-watched channel of a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopChannel {
    pub name: String,
    pub url: String,
    pub avatar_url: Option<String>,
    pub watch_count: u64,
    /// Share of the category's events, in percent.
    pub share: f64,
}

/// Headline figures for one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCard {
    pub category: Category,
    pub event_count: u64,
    pub estimated_hours: f64,
    pub duration_label: String,
    /// Estimated hours rounded to a whole number.
    pub approx_hours: u64,
    pub channel_count: usize,
    pub top_channel: Option<TopChannel>,
}

impl CategoryCard {
    fn from_stats(stats: &CategoryStats) -> Self {
        let top_channel = stats.channels.first().map(|c| TopChannel {
            name: c.name.clone(),
            url: c.url.clone(),
            avatar_url: c.avatar_url.clone(),
            watch_count: c.watch_count,
            share: share_percentage(c.watch_count, stats.event_count),
        });

        Self {
            category: stats.category,
            event_count: stats.event_count,
            estimated_hours: stats.estimated_hours,
            duration_label: format_duration(stats.estimated_hours),
            approx_hours: stats.estimated_hours.round() as u64,
            channel_count: stats.channel_count,
            top_channel,
        }
    }
}

/// Everything the overview screen and the text report display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub long_form: CategoryCard,
    pub short_form: CategoryCard,
    pub total_events: u64,
    pub total_estimated_hours: f64,
    pub total_duration_label: String,
    /// Distinct channels across both categories.
    pub total_channels: usize,
    /// `"3 years, 2 months"`; present only with a meaningful range.
    pub account_age: Option<String>,
    /// `"Since March 5, 2021"`; present only with a meaningful range.
    pub since_label: Option<String>,
    /// Newest watch as a long date in the display timezone.
    pub latest_label: Option<String>,
}

impl StatsSummary {
    /// Derive display values from `result`. `now` anchors the account-age
    /// label and `tz` is the timezone dates are shown in.
    pub fn build(result: &AggregateResult, now: DateTime<Utc>, tz: Tz) -> Self {
        let range = result.watch_range;
        Self {
            long_form: CategoryCard::from_stats(&result.long_form),
            short_form: CategoryCard::from_stats(&result.short_form),
            total_events: result.total_events,
            total_estimated_hours: result.total_estimated_hours,
            total_duration_label: format_duration(result.total_estimated_hours),
            total_channels: result.all_channels.len(),
            account_age: range.map(|r| elapsed_since(r.oldest, now)),
            since_label: range.map(|r| format!("Since {}", format_long_date(r.oldest, tz))),
            latest_label: range.map(|r| format_long_date(r.newest, tz)),
        }
    }

    pub fn card(&self, category: Category) -> &CategoryCard {
        match category {
            Category::LongForm => &self.long_form,
            Category::ShortForm => &self.short_form,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_events == 0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
