use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, StatsError};
use crate::models::{CategoryView, DurationPolicy};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Viewing statistics from a YouTube watch-history export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "watch-stats",
    about = "Viewing statistics from a YouTube watch-history export",
    version
)]
pub struct Settings {
    /// Export files or directories (directories are searched for *.json)
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// View mode
    #[arg(long, default_value = "overview", value_parser = ["overview", "channels", "report", "json"])]
    pub view: String,

    /// Content category to show
    #[arg(long, default_value = "all", value_parser = ["all", "long-form", "short-form"])]
    pub category: String,

    /// Number of channels listed in the report
    #[arg(long, default_value = "25", value_parser = clap::value_parser!(usize))]
    pub top: usize,

    /// Only list channels whose name contains this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Channel sort field
    #[arg(long, default_value = "watch_count", value_parser = ["rank", "name", "watch_count", "estimated_hours"])]
    pub sort: String,

    /// Reverse the sort direction
    #[arg(long)]
    pub reverse: bool,

    /// How duplicate records are handled: `event` drops repeats of the same
    /// URL and time, `url` keeps only the first watch of each URL (the
    /// counts the web uploader reports), `none` keeps everything
    #[arg(long, default_value = "event", value_parser = ["none", "event", "url"])]
    pub dedup: String,

    /// Assumed average length of a video, in minutes
    #[arg(long, default_value_t = DurationPolicy::DEFAULT_MINUTES_PER_VIDEO)]
    pub minutes_per_video: f64,

    /// Assumed average length of a short, in minutes
    #[arg(long, default_value_t = DurationPolicy::DEFAULT_MINUTES_PER_SHORT)]
    pub minutes_per_short: f64,

    /// Timezone for displayed dates (auto-detected if not specified)
    #[arg(long, default_value = "auto")]
    pub timezone: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted display preferences saved to `~/.watch-stats/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    /// Uses `~/.watch-stats/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".watch-stats").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());

        // Parse into the typed struct using the same args.
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins over persisted values. The `json` and `report`
        // views are one-shot outputs and are never restored.
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "category") {
            if let Some(v) = last.category {
                settings.category = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top") {
            if let Some(v) = last.top {
                settings.top = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "sort") {
            if let Some(v) = last.sort {
                settings.sort = v;
            }
        }

        settings = Self::resolve_auto_values(settings);

        // Persist current settings for next run.
        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        if settings.timezone == "auto" {
            settings.timezone = crate::time_utils::get_system_timezone();
        }

        // --debug overrides log level.
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }

    /// The duration policy configured on the command line.
    ///
    /// Rejects negative or non-finite averages.
    pub fn duration_policy(&self) -> Result<DurationPolicy> {
        for (flag, value) in [
            ("--minutes-per-video", self.minutes_per_video),
            ("--minutes-per-short", self.minutes_per_short),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StatsError::Config(format!(
                    "{flag} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(DurationPolicy {
            minutes_per_video: self.minutes_per_video,
            minutes_per_short: self.minutes_per_short,
        })
    }

    /// The category slice selected on the command line.
    pub fn category_view(&self) -> CategoryView {
        CategoryView::from_name(&self.category)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        let view = matches!(s.view.as_str(), "overview" | "channels").then(|| s.view.clone());
        LastUsedParams {
            view,
            category: Some(s.category.clone()),
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            top: Some(s.top),
            sort: Some(s.sort.clone()),
        }
    }
}

// ── Helper: check if an arg was explicitly set on the command line ─────────────

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
