//! Progress tracking
//!
//! Derived percentages and schedule, document import/export, and the store
//! that owns and persists a learner's state.

#![warn(missing_docs)]

pub mod calculator;
pub mod codec;
pub mod store;

pub use calculator::{
    current_week, dashboard, overall_progress, schedule, schedule_end, week_progress,
    weekly_progress, CalcError, Dashboard, ScheduleEntry, WeeklyProgress,
};
pub use codec::{export_document, export_file_name, import_document, ImportError, ValidationError};
pub use store::{ProgressStore, StoreConfig, StoreError, DEFAULT_NAME, STORAGE_KEY};
