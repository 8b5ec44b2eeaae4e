//! Per-record validity and content-category decisions.
//!
//! The classifier is a pure function of one [`WatchEvent`]: it never looks
//! at other records and never mutates anything.

use regex::Regex;
use stats_core::error::{Result, StatsError};
use stats_core::models::{Category, WatchEvent};

// ── ClassifierConfig ──────────────────────────────────────────────────────────

/// Provenance and marker strings the classifier matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Required `header` value.
    pub provenance: String,
    /// Required prefix of the `title` (action label).
    pub watch_prefix: String,
    /// URL fragment identifying short-form items.
    pub short_form_marker: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provenance: "YouTube".to_string(),
            watch_prefix: "Watched ".to_string(),
            short_form_marker: "/shorts/".to_string(),
        }
    }
}

// ── Rejection ─────────────────────────────────────────────────────────────────

/// Why a record was not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `header` is not the expected provenance tag (e.g. YouTube Music).
    ForeignSource,
    /// `title` does not start with the watch prefix (ads, searches, visits).
    NotAWatch,
    /// No usable `titleUrl`.
    MissingUrl,
}

// ── Classifier ────────────────────────────────────────────────────────────────

/// Decides whether a record is a retained watch event and, if so, its
/// category.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: ClassifierConfig,
    short_form: Regex,
}

impl Classifier {
    /// Build a classifier. The short-form marker is matched literally and
    /// case-insensitively.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        if config.short_form_marker.is_empty() {
            return Err(StatsError::Config(
                "short-form marker must not be empty".to_string(),
            ));
        }
        let pattern = format!("(?i){}", regex::escape(&config.short_form_marker));
        let short_form = Regex::new(&pattern)
            .map_err(|e| StatsError::Config(format!("invalid short-form marker: {e}")))?;
        Ok(Self { config, short_form })
    }

    /// The configuration this classifier was built from.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Validity check followed by category assignment.
    ///
    /// Checks run in order: provenance, watch prefix, URL presence.
    pub fn evaluate(&self, event: &WatchEvent) -> std::result::Result<Category, Rejection> {
        if event.source != self.config.provenance {
            return Err(Rejection::ForeignSource);
        }
        if !event.action_label.starts_with(&self.config.watch_prefix) {
            return Err(Rejection::NotAWatch);
        }
        let Some(url) = event
            .target_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
        else {
            return Err(Rejection::MissingUrl);
        };

        Ok(event
            .explicit_category
            .unwrap_or_else(|| self.category_for_url(url)))
    }

    /// `Some(category)` for retained records, `None` for rejected ones.
    pub fn classify(&self, event: &WatchEvent) -> Option<Category> {
        self.evaluate(event).ok()
    }

    /// URL heuristic alone: short-form when the marker is present.
    pub fn category_for_url(&self, url: &str) -> Category {
        if self.short_form.is_match(url) {
            Category::ShortForm
        } else {
            Category::LongForm
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
