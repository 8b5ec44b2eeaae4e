use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Content category of a watched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Regular videos.
    LongForm,
    /// Shorts.
    ShortForm,
}

impl Category {
    /// Both categories in display order.
    pub const ALL: [Category; 2] = [Category::LongForm, Category::ShortForm];

    /// Map an explicit `type` tag from an export record to a category.
    ///
    /// Accepts the tags written by the history scraper (`"video"`, `"short"`)
    /// as well as the serialized names of this enum. Matching is
    /// case-insensitive; anything else yields `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "video" | "long-form" | "longform" => Some(Self::LongForm),
            "short" | "shorts" | "short-form" | "shortform" => Some(Self::ShortForm),
            _ => None,
        }
    }

    /// Human-readable plural noun for items of this category.
    pub fn item_label(self) -> &'static str {
        match self {
            Self::LongForm => "videos",
            Self::ShortForm => "shorts",
        }
    }

    /// Section title used by the report and dashboard.
    pub fn title(self) -> &'static str {
        match self {
            Self::LongForm => "Videos",
            Self::ShortForm => "Shorts",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LongForm => f.write_str("long-form"),
            Self::ShortForm => f.write_str("short-form"),
        }
    }
}

/// Which slice of the result a view should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryView {
    /// Both categories combined.
    All,
    /// One category only.
    Only(Category),
}

impl CategoryView {
    /// Parse a CLI / persisted name. Unknown names fall back to [`CategoryView::All`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "long-form" => Self::Only(Category::LongForm),
            "short-form" => Self::Only(Category::ShortForm),
            _ => Self::All,
        }
    }

    /// Inverse of [`CategoryView::from_name`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(Category::LongForm) => "long-form",
            Self::Only(Category::ShortForm) => "short-form",
        }
    }

    /// Cycle `all → long-form → short-form → all`.
    pub fn next(self) -> Self {
        match self {
            Self::All => Self::Only(Category::LongForm),
            Self::Only(Category::LongForm) => Self::Only(Category::ShortForm),
            Self::Only(Category::ShortForm) => Self::All,
        }
    }
}

/// One `subtitles` entry of an export record: the channel that published
/// the watched item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    /// Channel display name.
    #[serde(default)]
    pub name: String,
    /// Channel URL; empty in scrape-sourced data.
    #[serde(default)]
    pub url: String,
    /// Channel avatar image URL, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A single record from a watch-history export.
///
/// Field names on the wire follow the Takeout `watch-history.json` layout.
/// Optional fields tolerate `null` and wrongly-typed values so that one odd
/// record never rejects a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchEvent {
    /// Provenance tag, e.g. `"YouTube"`.
    #[serde(rename = "header", default)]
    pub source: String,
    /// Action description, e.g. `"Watched Some Video"`.
    #[serde(rename = "title", default)]
    pub action_label: String,
    /// Link to the watched item.
    #[serde(
        rename = "titleUrl",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_url: Option<String>,
    /// Watch time as written by the source (usually RFC 3339).
    #[serde(
        rename = "time",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,
    /// Channel attribution; only the first entry is used.
    #[serde(
        rename = "subtitles",
        default,
        deserialize_with = "lenient_attribution",
        skip_serializing_if = "Option::is_none"
    )]
    pub attribution: Option<Vec<Attribution>>,
    /// Category tag written by the scraper; overrides URL-based detection.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_category",
        skip_serializing_if = "Option::is_none"
    )]
    pub explicit_category: Option<Category>,
}

impl WatchEvent {
    /// The first attribution entry, if it carries a non-blank channel name.
    pub fn channel(&self) -> Option<&Attribution> {
        self.attribution
            .as_deref()
            .and_then(|a| a.first())
            .filter(|a| !a.name.trim().is_empty())
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// A non-array `subtitles` reads as absent; entries keep only their
/// string-valued `name`, `url` and `avatar`.
fn lenient_attribution<'de, D>(deserializer: D) -> Result<Option<Vec<Attribution>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Array(items)) = value else {
        return Ok(None);
    };
    Ok(Some(
        items
            .iter()
            .map(|item| {
                let field = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);
                Attribution {
                    name: field("name").unwrap_or_default(),
                    url: field("url").unwrap_or_default(),
                    avatar: field("avatar"),
                }
            })
            .collect(),
    ))
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<Category>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Category::from_tag))
}

// ── Duration policy ───────────────────────────────────────────────────────────

/// Fixed average durations used to estimate watch time.
///
/// Nothing is measured: every item of a category is assumed to last exactly
/// its category's average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationPolicy {
    /// Assumed minutes per long-form video.
    pub minutes_per_video: f64,
    /// Assumed minutes per short.
    pub minutes_per_short: f64,
}

impl DurationPolicy {
    pub const DEFAULT_MINUTES_PER_VIDEO: f64 = 10.0;
    pub const DEFAULT_MINUTES_PER_SHORT: f64 = 0.5;

    /// Average minutes for one item of `category`.
    pub fn minutes_for(&self, category: Category) -> f64 {
        match category {
            Category::LongForm => self.minutes_per_video,
            Category::ShortForm => self.minutes_per_short,
        }
    }

    /// `count × minutes_for(category) / 60`.
    pub fn estimated_hours(&self, count: u64, category: Category) -> f64 {
        count as f64 * self.minutes_for(category) / 60.0
    }
}

impl Default for DurationPolicy {
    fn default() -> Self {
        Self {
            minutes_per_video: Self::DEFAULT_MINUTES_PER_VIDEO,
            minutes_per_short: Self::DEFAULT_MINUTES_PER_SHORT,
        }
    }
}

// ── Aggregate output ──────────────────────────────────────────────────────────

/// One ranked channel in an aggregate result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// 1-based position in the ranking it was produced for.
    pub rank: usize,
    /// Display name as first seen.
    pub name: String,
    /// First non-empty channel URL seen, or empty.
    pub url: String,
    /// First non-empty avatar URL seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Number of retained events attributed to this channel.
    pub watch_count: u64,
    /// Estimated watch time for this channel in hours.
    pub estimated_hours: f64,
}

/// Totals and ranking for one content category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,
    /// Retained events classified into this category.
    pub event_count: u64,
    /// `event_count × average minutes / 60`.
    pub estimated_hours: f64,
    /// Number of distinct channels (equals `channels.len()`).
    pub channel_count: usize,
    /// Channels sorted by descending watch count, ties in discovery order.
    pub channels: Vec<ChannelStats>,
}

impl CategoryStats {
    /// Zero counts and no channels.
    pub fn empty(category: Category) -> Self {
        Self {
            category,
            event_count: 0,
            estimated_hours: 0.0,
            channel_count: 0,
            channels: Vec::new(),
        }
    }
}

/// Oldest and newest valid watch timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub oldest: DateTime<Utc>,
    pub newest: DateTime<Utc>,
}

impl DateRange {
    /// Spread between oldest and newest in fractional days.
    pub fn span_days(&self) -> f64 {
        (self.newest - self.oldest).num_milliseconds() as f64 / 86_400_000.0
    }
}

/// Immutable snapshot produced by one aggregation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub long_form: CategoryStats,
    pub short_form: CategoryStats,
    /// Both categories merged under the same channel identity.
    pub all_channels: Vec<ChannelStats>,
    /// `long_form.event_count + short_form.event_count`.
    pub total_events: u64,
    /// `long_form.estimated_hours + short_form.estimated_hours`.
    pub total_estimated_hours: f64,
    /// Present only when the timestamps span more than one day.
    pub watch_range: Option<DateRange>,
}

impl AggregateResult {
    /// Stats for a single category.
    pub fn category(&self, category: Category) -> &CategoryStats {
        match category {
            Category::LongForm => &self.long_form,
            Category::ShortForm => &self.short_form,
        }
    }

    /// The oldest watch date, when the range is meaningful.
    pub fn oldest_watch(&self) -> Option<DateTime<Utc>> {
        self.watch_range.map(|r| r.oldest)
    }

    /// The newest watch date, when the range is meaningful.
    pub fn newest_watch(&self) -> Option<DateTime<Utc>> {
        self.watch_range.map(|r| r.newest)
    }

    /// `true` when a "since" date may be displayed.
    pub fn has_meaningful_range(&self) -> bool {
        self.watch_range.is_some()
    }

    /// `true` when no event survived filtering.
    pub fn is_empty(&self) -> bool {
        self.total_events == 0
    }

    /// Ranked channels for a view: one category or the combined ranking.
    pub fn channels_for(&self, view: CategoryView) -> &[ChannelStats] {
        match view {
            CategoryView::All => &self.all_channels,
            CategoryView::Only(category) => &self.category(category).channels,
        }
    }

    /// Event count for a view.
    pub fn events_for(&self, view: CategoryView) -> u64 {
        match view {
            CategoryView::All => self.total_events,
            CategoryView::Only(category) => self.category(category).event_count,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
