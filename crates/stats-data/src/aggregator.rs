//! Single-pass reduction of classified watch events into an
//! [`AggregateResult`].
//!
//! [`Aggregator`] is the fold state: [`Aggregator::step`] consumes one
//! retained event and [`Aggregator::finalize`] turns the state into rankings
//! and estimated durations. Events must be fed in input order, since both
//! tie-breaking and the first-non-empty URL/avatar rule depend on it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use stats_core::models::{
    AggregateResult, Attribution, Category, CategoryStats, ChannelStats, DateRange,
    DurationPolicy, WatchEvent,
};
use stats_core::time_utils::TimezoneHandler;

use crate::classifier::Classifier;

/// A "since" date is only shown when the history spans more than this.
pub const MEANINGFUL_RANGE_DAYS: f64 = 1.0;

// ── ChannelAccumulator ────────────────────────────────────────────────────────

/// Running counters for one channel within one map.
#[derive(Debug, Clone)]
struct ChannelAccumulator {
    display_name: String,
    canonical_url: String,
    avatar_url: Option<String>,
    long_form: u64,
    short_form: u64,
}

impl ChannelAccumulator {
    fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            canonical_url: String::new(),
            avatar_url: None,
            long_form: 0,
            short_form: 0,
        }
    }

    fn watch_count(&self) -> u64 {
        self.long_form + self.short_form
    }

    /// Count one event and adopt URL/avatar only if none is stored yet.
    fn record(&mut self, attribution: &Attribution, category: Category) {
        match category {
            Category::LongForm => self.long_form += 1,
            Category::ShortForm => self.short_form += 1,
        }

        let url = attribution.url.trim();
        if self.canonical_url.is_empty() && !url.is_empty() {
            self.canonical_url = url.to_string();
        }

        if self.avatar_url.is_none() {
            if let Some(avatar) = attribution
                .avatar
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
            {
                self.avatar_url = Some(avatar.to_string());
            }
        }
    }

    fn estimated_hours(&self, policy: &DurationPolicy) -> f64 {
        policy.estimated_hours(self.long_form, Category::LongForm)
            + policy.estimated_hours(self.short_form, Category::ShortForm)
    }
}

// ── ChannelMap ────────────────────────────────────────────────────────────────

/// Channels keyed by case-folded name, kept in discovery order.
#[derive(Debug, Clone, Default)]
struct ChannelMap {
    index: HashMap<String, usize>,
    channels: Vec<ChannelAccumulator>,
}

impl ChannelMap {
    fn record(&mut self, attribution: &Attribution, category: Category) {
        let name = attribution.name.trim();
        let key = normalize_channel_key(name);
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.channels.push(ChannelAccumulator::new(name));
                self.index.insert(key, self.channels.len() - 1);
                self.channels.len() - 1
            }
        };
        self.channels[slot].record(attribution, category);
    }

    fn len(&self) -> usize {
        self.channels.len()
    }

    /// Descending by watch count; the sort is stable so equal counts keep
    /// discovery order.
    fn into_ranked(self, policy: &DurationPolicy) -> Vec<ChannelStats> {
        let mut channels = self.channels;
        channels.sort_by(|a, b| b.watch_count().cmp(&a.watch_count()));
        channels
            .into_iter()
            .enumerate()
            .map(|(i, acc)| ChannelStats {
                rank: i + 1,
                estimated_hours: acc.estimated_hours(policy),
                watch_count: acc.watch_count(),
                name: acc.display_name,
                url: acc.canonical_url,
                avatar_url: acc.avatar_url,
            })
            .collect()
    }
}

/// Identity key for a channel: its trimmed, case-folded display name.
///
/// Two different channels sharing a name (ignoring case) are merged.
pub fn normalize_channel_key(name: &str) -> String {
    name.trim().to_lowercase()
}

// ── CategoryState ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
struct CategoryState {
    event_count: u64,
    channels: ChannelMap,
}

impl CategoryState {
    fn finalize(self, category: Category, policy: &DurationPolicy) -> CategoryStats {
        let channel_count = self.channels.len();
        CategoryStats {
            category,
            event_count: self.event_count,
            estimated_hours: policy.estimated_hours(self.event_count, category),
            channel_count,
            channels: self.channels.into_ranked(policy),
        }
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Fold state for one aggregation run.
pub struct Aggregator {
    long_form: CategoryState,
    short_form: CategoryState,
    combined: ChannelMap,
    oldest: Option<DateTime<Utc>>,
    newest: Option<DateTime<Utc>>,
    timestamps: TimezoneHandler,
}

impl Aggregator {
    /// Empty state. Naive timestamps are read as UTC.
    pub fn new() -> Self {
        Self {
            long_form: CategoryState::default(),
            short_form: CategoryState::default(),
            combined: ChannelMap::default(),
            oldest: None,
            newest: None,
            timestamps: TimezoneHandler::utc(),
        }
    }

    /// Fold one retained event into the state.
    ///
    /// An unparseable timestamp only excludes the event from range tracking;
    /// missing or blank attribution only excludes it from channel counts.
    pub fn step(&mut self, event: &WatchEvent, category: Category) {
        let state = match category {
            Category::LongForm => &mut self.long_form,
            Category::ShortForm => &mut self.short_form,
        };
        state.event_count += 1;

        if let Some(ts) = event
            .timestamp
            .as_deref()
            .and_then(|s| self.timestamps.parse_timestamp(s))
        {
            if self.oldest.is_none_or(|o| ts < o) {
                self.oldest = Some(ts);
            }
            if self.newest.is_none_or(|n| ts > n) {
                self.newest = Some(ts);
            }
        }

        if let Some(attribution) = event.channel() {
            state.channels.record(attribution, category);
            self.combined.record(attribution, category);
        }
    }

    /// Number of events folded so far.
    pub fn event_count(&self) -> u64 {
        self.long_form.event_count + self.short_form.event_count
    }

    /// Produce the immutable result, consuming the state.
    pub fn finalize(self, policy: &DurationPolicy) -> AggregateResult {
        let watch_range = match (self.oldest, self.newest) {
            (Some(oldest), Some(newest)) => Some(DateRange { oldest, newest }),
            _ => None,
        }
        .filter(|range| range.span_days() > MEANINGFUL_RANGE_DAYS);

        let long_form = self.long_form.finalize(Category::LongForm, policy);
        let short_form = self.short_form.finalize(Category::ShortForm, policy);

        AggregateResult {
            total_events: long_form.event_count + short_form.event_count,
            total_estimated_hours: long_form.estimated_hours + short_form.estimated_hours,
            all_channels: self.combined.into_ranked(policy),
            long_form,
            short_form,
            watch_range,
        }
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify and fold `events` in order, then finalize.
pub fn aggregate<'a, I>(
    events: I,
    classifier: &Classifier,
    policy: &DurationPolicy,
) -> AggregateResult
where
    I: IntoIterator<Item = &'a WatchEvent>,
{
    events
        .into_iter()
        .filter_map(|event| classifier.classify(event).map(|category| (event, category)))
        .fold(Aggregator::new(), |mut state, (event, category)| {
            state.step(event, category);
            state
        })
        .finalize(policy)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;

    fn watch(url: &str, time: &str, channel: Option<(&str, &str)>) -> WatchEvent {
        WatchEvent {
            source: "YouTube".to_string(),
            action_label: "Watched something".to_string(),
            target_url: Some(url.to_string()),
            timestamp: Some(time.to_string()),
            attribution: channel.map(|(name, url)| {
                vec![Attribution {
                    name: name.to_string(),
                    url: url.to_string(),
                    avatar: None,
                }]
            }),
            explicit_category: None,
        }
    }

    fn video(channel: &str, channel_url: &str) -> WatchEvent {
        watch(
            "https://www.youtube.com/watch?v=v",
            "2024-03-01T10:00:00Z",
            Some((channel, channel_url)),
        )
    }

    fn short(channel: &str) -> WatchEvent {
        watch(
            "https://www.youtube.com/shorts/s",
            "2024-03-01T10:00:00Z",
            Some((channel, "")),
        )
    }

    fn run(events: &[WatchEvent]) -> AggregateResult {
        aggregate(events, &Classifier::new(ClassifierConfig::default()).unwrap(), &DurationPolicy::default())
    }

    // ── Scenarios ─────────────────────────────────────────────────────────────

    #[test]
    fn test_scenario_mixed_categories_and_late_url() {
        let events = vec![
            video("Alpha", ""),
            video("Alpha", "https://www.youtube.com/@alpha"),
            video("Alpha", ""),
            short("Beta"),
        ];
        let result = run(&events);

        assert_eq!(result.long_form.event_count, 3);
        assert_eq!(result.short_form.event_count, 1);
        assert_eq!(result.long_form.channel_count, 1);
        assert!(result.long_form.channels.iter().all(|c| c.name != "Beta"));

        let alpha = &result.long_form.channels[0];
        assert_eq!(alpha.name, "Alpha");
        assert_eq!(alpha.watch_count, 3);
        assert_eq!(alpha.url, "https://www.youtube.com/@alpha");
        assert_eq!(result.short_form.channels[0].name, "Beta");
    }

    #[test]
    fn test_scenario_estimated_hours_from_policy() {
        let events: Vec<WatchEvent> = (0..1000).map(|_| video("Alpha", "")).collect();
        let policy = DurationPolicy {
            minutes_per_video: 12.0,
            minutes_per_short: 0.5,
        };
        let result = aggregate(&events, &Classifier::new(ClassifierConfig::default()).unwrap(), &policy);

        assert_eq!(result.long_form.event_count, 1000);
        assert!((result.long_form.estimated_hours - 200.0).abs() < 1e-9);
        assert!((result.long_form.channels[0].estimated_hours - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_case_variants_merge() {
        let result = run(&[video("Alpha", ""), video("alpha", "")]);

        assert_eq!(result.long_form.channel_count, 1);
        assert_eq!(result.long_form.channels[0].watch_count, 2);
        // Display name comes from the first event.
        assert_eq!(result.long_form.channels[0].name, "Alpha");
    }

    #[test]
    fn test_scenario_same_minute_suppresses_range() {
        let events = vec![
            watch("https://www.youtube.com/watch?v=1", "2024-03-01T10:00:05Z", None),
            watch("https://www.youtube.com/watch?v=2", "2024-03-01T10:00:30Z", None),
            watch("https://www.youtube.com/watch?v=3", "2024-03-01T10:00:59Z", None),
        ];
        let result = run(&events);

        assert_eq!(result.total_events, 3);
        assert!(result.oldest_watch().is_none());
        assert!(!result.has_meaningful_range());
    }

    #[test]
    fn test_scenario_nothing_retained() {
        let mut foreign = video("Alpha", "");
        foreign.source = "YouTube Music".to_string();
        let mut search = video("Alpha", "");
        search.action_label = "Searched for rust".to_string();
        let mut no_url = video("Alpha", "");
        no_url.target_url = None;

        let result = run(&[foreign, search, no_url]);

        assert!(result.is_empty());
        assert_eq!(result.long_form, CategoryStats::empty(Category::LongForm));
        assert_eq!(result.short_form, CategoryStats::empty(Category::ShortForm));
        assert!(result.all_channels.is_empty());
        assert_eq!(result.total_estimated_hours, 0.0);
        assert!(result.watch_range.is_none());
    }

    // ── Properties ────────────────────────────────────────────────────────────

    #[test]
    fn test_deterministic() {
        let events = vec![
            video("Alpha", ""),
            short("Beta"),
            video("Gamma", "https://g"),
            video("alpha", "https://a"),
            short("beta"),
        ];
        let first = serde_json::to_string(&run(&events)).unwrap();
        let second = serde_json::to_string(&run(&events)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_count_conservation() {
        let events = vec![
            video("Alpha", ""),
            watch("https://www.youtube.com/watch?v=x", "2024-03-01T10:00:00Z", None),
            watch(
                "https://www.youtube.com/watch?v=y",
                "2024-03-01T10:00:00Z",
                Some(("", "https://nameless")),
            ),
            video("Beta", ""),
            short("Gamma"),
        ];
        let result = run(&events);

        let long_sum: u64 = result.long_form.channels.iter().map(|c| c.watch_count).sum();
        let short_sum: u64 = result.short_form.channels.iter().map(|c| c.watch_count).sum();
        assert_eq!(result.long_form.event_count, 4);
        assert_eq!(long_sum, 2);
        assert_eq!(short_sum, result.short_form.event_count);
        assert_eq!(
            result.total_events,
            result.long_form.event_count + result.short_form.event_count
        );
    }

    #[test]
    fn test_stable_ranking_preserves_discovery_order() {
        let events = vec![
            video("Zeta", ""),
            video("Alpha", ""),
            video("Mid", ""),
            video("Mid", ""),
            video("Beta", ""),
        ];
        let result = run(&events);
        let names: Vec<&str> = result
            .long_form
            .channels
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Mid", "Zeta", "Alpha", "Beta"]);
        let ranks: Vec<usize> = result.long_form.channels.iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_first_non_empty_url_wins() {
        let events = vec![
            video("Alpha", ""),
            video("ALPHA", "https://second"),
            video("alpha", "https://third"),
            video("Alpha", ""),
        ];
        let result = run(&events);
        assert_eq!(result.long_form.channels[0].url, "https://second");
        assert_eq!(result.all_channels[0].url, "https://second");
    }

    #[test]
    fn test_first_non_empty_avatar_wins() {
        let mut first = video("Alpha", "");
        first.attribution.as_mut().unwrap()[0].avatar = Some(String::new());
        let mut second = video("Alpha", "");
        second.attribution.as_mut().unwrap()[0].avatar = Some("https://img/1.jpg".to_string());
        let mut third = video("Alpha", "");
        third.attribution.as_mut().unwrap()[0].avatar = Some("https://img/2.jpg".to_string());

        let result = run(&[first, second, third]);
        assert_eq!(
            result.long_form.channels[0].avatar_url.as_deref(),
            Some("https://img/1.jpg")
        );
    }

    #[test]
    fn test_range_present_when_spanning_more_than_a_day() {
        let events = vec![
            watch("https://www.youtube.com/watch?v=1", "2024-03-05T10:00:00Z", None),
            watch("https://www.youtube.com/watch?v=2", "2023-11-20T08:30:00Z", None),
            watch("https://www.youtube.com/watch?v=3", "not a date", None),
            watch("https://www.youtube.com/watch?v=4", "2024-01-01T00:00:00Z", None),
        ];
        let result = run(&events);

        assert_eq!(result.total_events, 4);
        let range = result.watch_range.unwrap();
        assert_eq!(range.oldest.to_rfc3339(), "2023-11-20T08:30:00+00:00");
        assert_eq!(range.newest.to_rfc3339(), "2024-03-05T10:00:00+00:00");
    }

    #[test]
    fn test_range_of_exactly_one_day_is_suppressed() {
        let events = vec![
            watch("https://www.youtube.com/watch?v=1", "2024-03-01T10:00:00Z", None),
            watch("https://www.youtube.com/watch?v=2", "2024-03-02T10:00:00Z", None),
        ];
        assert!(run(&events).watch_range.is_none());
    }

    #[test]
    fn test_combined_ranking_merges_categories() {
        let events = vec![
            short("Beta"),
            video("Alpha", ""),
            video("beta", "https://beta"),
            short("BETA"),
        ];
        let result = run(&events);

        assert_eq!(result.all_channels.len(), 2);
        let beta = &result.all_channels[0];
        assert_eq!(beta.name, "Beta");
        assert_eq!(beta.watch_count, 3);
        assert_eq!(beta.url, "https://beta");
        // One video at 10 min plus two shorts at 0.5 min.
        assert!((beta.estimated_hours - 11.0 / 60.0).abs() < 1e-9);
        assert_eq!(result.all_channels[1].name, "Alpha");
    }

    #[test]
    fn test_step_counts_events_without_classifier() {
        let mut state = Aggregator::new();
        state.step(&video("Alpha", ""), Category::ShortForm);
        state.step(&video("Alpha", ""), Category::LongForm);
        assert_eq!(state.event_count(), 2);

        let result = state.finalize(&DurationPolicy::default());
        assert_eq!(result.short_form.event_count, 1);
        assert_eq!(result.long_form.event_count, 1);
        assert_eq!(result.all_channels[0].watch_count, 2);
    }

    #[test]
    fn test_normalize_channel_key() {
        assert_eq!(normalize_channel_key("  Linus Tech Tips "), "linus tech tips");
        assert_eq!(normalize_channel_key("ÉCOLE"), "école");
    }
}
