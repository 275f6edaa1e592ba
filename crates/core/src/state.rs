//! Progress state - the single mutable document a learner owns.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::Catalog;
use crate::time::format_iso;
use crate::Time;

/// Theme assigned to freshly created state.
pub const DEFAULT_THEME: &str = "futuristic";

const WEEK_KEY_PREFIX: &str = "week-";

/// Document key for a week's completion flags (`week-<n>`).
pub fn week_key(week_number: u32) -> String {
    format!("{WEEK_KEY_PREFIX}{week_number}")
}

fn parse_week_key(key: &str) -> Option<u32> {
    let digits = key.strip_prefix(WEEK_KEY_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Reject `week-01` so every number has exactly one spelling.
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    digits.parse().ok().filter(|n| *n > 0)
}

/// Errors raised when state does not line up with the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The week is not part of the catalog
    #[error("week {0} is not in the catalog")]
    UnknownWeek(u32),

    /// Task index past the end of the week
    #[error("task {index} is out of range for week {week} ({count} tasks)")]
    TaskOutOfRange {
        /// Week number
        week: u32,
        /// Offending zero-based index
        index: usize,
        /// Number of tasks the week defines
        count: usize,
    },

    /// A catalog week has no flags
    #[error("no progress recorded for week {0}")]
    MissingWeek(u32),

    /// Flags for a week the catalog does not define
    #[error("progress recorded for week {0}, which is not in the catalog")]
    UnexpectedWeek(u32),

    /// Flag count differs from the week's task count
    #[error("week {week} has {found} flags but {expected} tasks")]
    TaskCountMismatch {
        /// Week number
        week: u32,
        /// Task count from the catalog
        expected: usize,
        /// Flag count in the state
        found: usize,
    },

    /// Start date is not an RFC 3339 timestamp
    #[error("invalid start date {value:?}: {source}")]
    InvalidStartDate {
        /// The stored text
        value: String,
        /// Parser error
        #[source]
        source: chrono::ParseError,
    },
}

/// Per-week completion flags, keyed by week number.
///
/// Serialized as a JSON object `{"week-1": [false, true, ...], ...}` with
/// keys in ascending week order, so output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekFlags(BTreeMap<u32, Vec<bool>>);

impl WeekFlags {
    /// All-false flags for every week in the catalog.
    pub fn defaults(catalog: &Catalog) -> Self {
        Self(
            catalog
                .iter()
                .map(|w| (w.week_number, vec![false; w.task_count()]))
                .collect(),
        )
    }

    /// Flags for one week.
    pub fn get(&self, week_number: u32) -> Option<&[bool]> {
        self.0.get(&week_number).map(Vec::as_slice)
    }

    /// Replace the flags for one week, returning the previous ones.
    pub fn insert(&mut self, week_number: u32, flags: Vec<bool>) -> Option<Vec<bool>> {
        self.0.insert(week_number, flags)
    }

    /// Number of completed tasks recorded for a week.
    pub fn completed(&self, week_number: u32) -> usize {
        self.get(week_number)
            .map(|flags| flags.iter().filter(|done| **done).count())
            .unwrap_or(0)
    }

    /// Iterate `(week_number, flags)` in ascending week order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[bool])> {
        self.0.iter().map(|(week, flags)| (*week, flags.as_slice()))
    }

    /// Number of weeks with recorded flags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no week has recorded flags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn flags_mut(&mut self, week_number: u32) -> Option<&mut Vec<bool>> {
        self.0.get_mut(&week_number)
    }
}

impl FromIterator<(u32, Vec<bool>)> for WeekFlags {
    fn from_iter<I: IntoIterator<Item = (u32, Vec<bool>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for WeekFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (week, flags) in &self.0 {
            map.serialize_entry(&week_key(*week), flags)?;
        }
        map.end()
    }
}

struct WeekFlagsVisitor;

impl<'de> Visitor<'de> for WeekFlagsVisitor {
    type Value = WeekFlags;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of \"week-<n>\" keys to boolean arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut weeks = BTreeMap::new();
        while let Some(key) = access.next_key::<String>()? {
            let week = parse_week_key(&key).ok_or_else(|| {
                <A::Error as de::Error>::custom(format!("invalid week key {key:?}"))
            })?;
            let flags: Vec<bool> = access.next_value()?;
            if weeks.insert(week, flags).is_some() {
                return Err(<A::Error as de::Error>::custom(format!("duplicate week key {key:?}")));
            }
        }
        Ok(WeekFlags(weeks))
    }
}

impl<'de> Deserialize<'de> for WeekFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(WeekFlagsVisitor)
    }
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

/// Everything a learner has recorded.
///
/// Field order here is the key order of the exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Curriculum start, RFC 3339 text kept verbatim
    pub start_date: String,

    /// Completion flags per week
    pub weeks: WeekFlags,

    /// UI theme name
    #[serde(default = "default_theme")]
    pub theme: String,

    /// Free-text notes
    #[serde(default)]
    pub notes: String,
}

impl ProgressState {
    /// Fresh state for a new install: nothing done, starting `now`.
    pub fn defaults(catalog: &Catalog, name: impl Into<String>, now: Time) -> Self {
        Self {
            name: name.into(),
            start_date: format_iso(now),
            weeks: WeekFlags::defaults(catalog),
            theme: default_theme(),
            notes: String::new(),
        }
    }

    /// Parse the start date.
    pub fn start_time(&self) -> Result<Time, StateError> {
        DateTime::parse_from_rfc3339(&self.start_date)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|source| StateError::InvalidStartDate {
                value: self.start_date.clone(),
                source,
            })
    }

    /// Check that every catalog week has exactly one flag per task, that no
    /// other weeks are present and that the start date parses.
    pub fn validate(&self, catalog: &Catalog) -> Result<(), StateError> {
        for week in catalog {
            let flags = self
                .weeks
                .get(week.week_number)
                .ok_or(StateError::MissingWeek(week.week_number))?;
            if flags.len() != week.task_count() {
                return Err(StateError::TaskCountMismatch {
                    week: week.week_number,
                    expected: week.task_count(),
                    found: flags.len(),
                });
            }
        }
        if let Some((week, _)) = self.weeks.iter().find(|(w, _)| catalog.week(*w).is_none()) {
            return Err(StateError::UnexpectedWeek(week));
        }
        self.start_time()?;
        Ok(())
    }

    /// Whether a task is marked done. `None` when nothing is recorded for it.
    pub fn is_done(&self, week_number: u32, task_index: usize) -> Option<bool> {
        self.weeks.get(week_number)?.get(task_index).copied()
    }

    /// Flip one task flag and return its new value.
    pub fn toggle_task(
        &mut self,
        catalog: &Catalog,
        week_number: u32,
        task_index: usize,
    ) -> Result<bool, StateError> {
        let flag = self.flag_mut(catalog, week_number, task_index)?;
        *flag = !*flag;
        Ok(*flag)
    }

    /// Set one task flag.
    pub fn set_task(
        &mut self,
        catalog: &Catalog,
        week_number: u32,
        task_index: usize,
        done: bool,
    ) -> Result<(), StateError> {
        *self.flag_mut(catalog, week_number, task_index)? = done;
        Ok(())
    }

    /// Clear every flag, keeping name, start date, theme and notes.
    pub fn reset_weeks(&mut self, catalog: &Catalog) {
        self.weeks = WeekFlags::defaults(catalog);
    }

    fn flag_mut(
        &mut self,
        catalog: &Catalog,
        week_number: u32,
        task_index: usize,
    ) -> Result<&mut bool, StateError> {
        let week = catalog
            .week(week_number)
            .ok_or(StateError::UnknownWeek(week_number))?;
        if task_index >= week.task_count() {
            return Err(StateError::TaskOutOfRange {
                week: week_number,
                index: task_index,
                count: week.task_count(),
            });
        }
        let flags = self
            .weeks
            .flags_mut(week_number)
            .ok_or(StateError::MissingWeek(week_number))?;
        let found = flags.len();
        flags
            .get_mut(task_index)
            .ok_or(StateError::TaskCountMismatch {
                week: week_number,
                expected: week.task_count(),
                found,
            })
    }
}
