//! Main analysis pipeline for watch-stats.
//!
//! Orchestrates loading, classification and aggregation, returning an
//! [`AnalysisResult`] ready for the UI layer and the text/JSON reports.

use std::path::PathBuf;

use chrono::Utc;
use stats_core::error::Result;
use stats_core::models::{AggregateResult, DurationPolicy, WatchEvent};
use tracing::{debug, info};

use crate::aggregator::Aggregator;
use crate::classifier::{Classifier, ClassifierConfig, Rejection};
use crate::reader::{load_history, DedupPolicy};

// ── Public types ──────────────────────────────────────────────────────────────

/// Knobs for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub dedup: DedupPolicy,
    pub classifier: ClassifierConfig,
    pub durations: DurationPolicy,
}

/// Counters and timings produced alongside the aggregate.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Number of JSON documents read.
    pub files_read: usize,
    /// Records found in those documents.
    pub records_read: usize,
    /// Records that could not be read as a watch event.
    pub records_skipped: usize,
    /// Records dropped as duplicates.
    pub duplicates_removed: usize,
    /// Records from a different provenance (e.g. YouTube Music).
    pub rejected_foreign: usize,
    /// Records that are not watches (ads, searches, visits).
    pub rejected_not_watch: usize,
    /// Watch records without a usable URL.
    pub rejected_missing_url: usize,
    /// Events that reached the aggregator.
    pub events_retained: u64,
    /// Wall-clock seconds spent reading the input files.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent classifying and aggregating.
    pub aggregate_time_seconds: f64,
}

impl AnalysisMetadata {
    /// Total records the classifier turned away.
    pub fn rejected(&self) -> usize {
        self.rejected_foreign + self.rejected_not_watch + self.rejected_missing_url
    }

    fn count_rejection(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::ForeignSource => self.rejected_foreign += 1,
            Rejection::NotAWatch => self.rejected_not_watch += 1,
            Rejection::MissingUrl => self.rejected_missing_url += 1,
        }
    }
}

/// The complete output of [`analyze_history`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub result: AggregateResult,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline over files and directories on disk.
///
/// 1. Load and dedup records from `inputs`.
/// 2. Classify and aggregate them via [`analyze_events`].
pub fn analyze_history(inputs: &[PathBuf], options: &AnalysisOptions) -> Result<AnalysisResult> {
    // ── Step 1: Load records ──────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let history = load_history(inputs, options.dedup)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Aggregate ─────────────────────────────────────────────────────
    let mut analysis = analyze_events(&history.events, options)?;

    let metadata = &mut analysis.metadata;
    metadata.files_read = history.files_read;
    metadata.records_read = history.records_read;
    metadata.records_skipped = history.records_skipped;
    metadata.duplicates_removed = history.duplicates_removed;
    metadata.load_time_seconds = load_time;

    Ok(analysis)
}

/// Classify and aggregate in-memory events, counting rejections by reason.
pub fn analyze_events(events: &[WatchEvent], options: &AnalysisOptions) -> Result<AnalysisResult> {
    let classifier = Classifier::new(options.classifier.clone())?;
    let mut metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        records_read: events.len(),
        ..Default::default()
    };

    let start = std::time::Instant::now();
    let mut state = Aggregator::new();
    for (i, event) in events.iter().enumerate() {
        match classifier.evaluate(event) {
            Ok(category) => state.step(event, category),
            Err(rejection) => {
                debug!("Record {} rejected: {:?}", i, rejection);
                metadata.count_rejection(rejection);
            }
        }
    }
    metadata.events_retained = state.event_count();
    let result = state.finalize(&options.durations);
    metadata.aggregate_time_seconds = start.elapsed().as_secs_f64();

    info!(
        "Aggregated {} events ({} videos, {} shorts) across {} channels; {} rejected",
        result.total_events,
        result.long_form.event_count,
        result.short_form.event_count,
        result.all_channels.len(),
        metadata.rejected(),
    );

    Ok(AnalysisResult { result, metadata })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
