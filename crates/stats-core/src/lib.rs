//! Shared building blocks for watch-stats.
//!
//! Holds the watch-history data model, the error type, CLI settings, number
//! and duration formatting, and timestamp/timezone helpers used by the data
//! and UI layers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
