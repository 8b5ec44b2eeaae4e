//! Watch-history file discovery and loading.
//!
//! Accepts Takeout `watch-history.json` files, scraper output (a bare array
//! or an object with an `entries` array), or directories containing either.
//! Documents are shape-checked here so that nothing structurally invalid
//! reaches the classifier; individual records that cannot be read as a
//! [`WatchEvent`] are skipped.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use stats_core::error::{Result, StatsError};
use stats_core::models::WatchEvent;
use tracing::{debug, info, warn};

// ── DedupPolicy ───────────────────────────────────────────────────────────────

/// How repeated records across (or within) input files are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupPolicy {
    /// Keep every record.
    None,
    /// Drop records whose `titleUrl` and `time` both match an earlier one.
    #[default]
    Event,
    /// Keep only the first record for each `titleUrl`.
    Url,
}

impl DedupPolicy {
    /// Parse a CLI name. Unknown names fall back to [`DedupPolicy::Event`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "none" => Self::None,
            "url" => Self::Url,
            _ => Self::Event,
        }
    }
}

// ── LoadedHistory ─────────────────────────────────────────────────────────────

/// Records read from all inputs, in input order.
#[derive(Debug, Clone, Default)]
pub struct LoadedHistory {
    pub events: Vec<WatchEvent>,
    /// JSON files parsed.
    pub files_read: usize,
    /// Records in those files, before skipping and dedup.
    pub records_read: usize,
    /// Records that could not be read as a watch event.
    pub records_skipped: usize,
    /// Records dropped by the dedup policy.
    pub duplicates_removed: usize,
}

/// Records parsed from a single document.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    pub events: Vec<WatchEvent>,
    pub skipped: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `dir`, sorted by path.
pub fn find_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("json"))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Expand the given inputs into the list of files to read.
///
/// Files are taken as given (whatever their extension); directories are
/// searched for `*.json`. A missing path or a directory without JSON files
/// is an error.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = find_json_files(input);
            if found.is_empty() {
                return Err(StatsError::NoDataFiles(input.clone()));
            }
            debug!("Found {} JSON files under {}", found.len(), input.display());
            files.extend(found);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(StatsError::DataPathNotFound(input.clone()));
        }
    }
    Ok(files)
}

/// Load every input, concatenate records in path order, then dedup.
pub fn load_history(inputs: &[PathBuf], dedup: DedupPolicy) -> Result<LoadedHistory> {
    let files = resolve_inputs(inputs)?;

    let mut history = LoadedHistory::default();
    for path in &files {
        let document = read_history_file(path)?;
        history.files_read += 1;
        history.records_read += document.events.len() + document.skipped;
        history.records_skipped += document.skipped;
        history.events.extend(document.events);
    }

    let (events, removed) = dedup_events(history.events, dedup);
    history.events = events;
    history.duplicates_removed = removed;

    info!(
        "Loaded {} records from {} files ({} skipped, {} duplicates removed)",
        history.events.len(),
        history.files_read,
        history.records_skipped,
        history.duplicates_removed,
    );

    Ok(history)
}

/// Read and parse one history document from disk.
pub fn read_history_file(path: &Path) -> Result<ParsedDocument> {
    let text = std::fs::read_to_string(path).map_err(|source| StatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let document = parse_history_str(&text).inspect_err(|e| {
        warn!("Rejected {}: {}", path.display(), e);
    })?;
    debug!(
        "File {}: {} events, {} skipped",
        path.display(),
        document.events.len(),
        document.skipped
    );
    Ok(document)
}

/// Parse a history document from JSON text.
pub fn parse_history_str(text: &str) -> Result<ParsedDocument> {
    let value: Value = serde_json::from_str(text)?;
    parse_history_value(value)
}

/// Validate the top-level shape of a parsed document and extract its
/// records.
///
/// Accepted shapes are a bare array of records, or an object whose
/// `entries` key holds one. Any other keys of a wrapper object (precomputed
/// summaries and the like) are ignored.
pub fn parse_history_value(value: Value) -> Result<ParsedDocument> {
    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("entries") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(StatsError::InvalidShape(format!(
                    "`entries` must be an array, found {}",
                    kind_of(&other)
                )))
            }
            None => {
                return Err(StatsError::InvalidShape(
                    "object has no `entries` array".to_string(),
                ))
            }
        },
        other => {
            return Err(StatsError::InvalidShape(format!(
                "expected an array of watch events or an object with `entries`, found {}",
                kind_of(&other)
            )))
        }
    };

    let mut document = ParsedDocument::default();
    for (i, record) in records.into_iter().enumerate() {
        if !record.is_object() {
            debug!("Skipping record {}: not an object", i);
            document.skipped += 1;
            continue;
        }
        match serde_json::from_value::<WatchEvent>(record) {
            Ok(event) => document.events.push(event),
            Err(e) => {
                debug!("Skipping record {}: {}", i, e);
                document.skipped += 1;
            }
        }
    }
    Ok(document)
}

/// Apply `policy`, keeping the first occurrence of each duplicate.
///
/// Records without a `titleUrl` are never treated as duplicates. Returns the
/// kept records and how many were removed.
pub fn dedup_events(events: Vec<WatchEvent>, policy: DedupPolicy) -> (Vec<WatchEvent>, usize) {
    if policy == DedupPolicy::None {
        return (events, 0);
    }

    let before = events.len();
    let mut seen: HashSet<(String, Option<String>)> = HashSet::new();
    let kept: Vec<WatchEvent> = events
        .into_iter()
        .filter(|event| {
            let Some(url) = event.target_url.as_deref() else {
                return true;
            };
            let time = match policy {
                DedupPolicy::Event => event.timestamp.clone(),
                _ => None,
            };
            seen.insert((url.to_string(), time))
        })
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
