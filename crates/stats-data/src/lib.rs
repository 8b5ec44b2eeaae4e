//! Data layer for watch-stats.
//!
//! Reads watch-history export documents from disk, classifies each record
//! into a content category, folds the retained events into per-category
//! channel rankings, and derives the presentation-ready summary.

pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod reader;
pub mod summary;

pub use stats_core as core;
