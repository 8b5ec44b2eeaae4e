//! Terminal UI layer for watch-stats.
//!
//! Provides themes, share bars, the header component, the overview and
//! channel table views, and the application event loop built on top of
//! [`ratatui`] for browsing watch statistics in the terminal.

pub mod app;
pub mod components;
pub mod overview_view;
pub mod table_view;
pub mod themes;

pub use stats_core as core;
