//! Roadmap core data models.
//!
//! This crate defines the static curriculum (the [`Catalog`]) and the
//! mutable per-user [`ProgressState`] that the rest of the workspace derives
//! percentages and schedules from.

#![warn(missing_docs)]

// Curriculum
mod catalog;

// User progress
mod state;
mod time;

// Re-exports
pub use catalog::{Catalog, CatalogError, WeekDefinition};
pub use state::{
    week_key, ProgressState, StateError, WeekFlags, DEFAULT_THEME,
};
pub use time::{format_iso, Clock};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
