//! Derived progress values: percentages and the weekly calendar.
//!
//! Everything here is a pure function of the catalog and a state snapshot.
//! Nothing is cached; callers recompute after every change.

use chrono::Duration;
use roadmap_core::{Catalog, ProgressState, StateError, Time, WeekDefinition};
use serde::Serialize;

/// Errors from progress derivation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalcError {
    /// Overall progress of an empty catalog has no meaning
    #[error("catalog has no weeks")]
    EmptyCatalog,

    /// The schedule needs a parseable start date
    #[error("cannot build schedule: {0}")]
    InvalidStartDate(#[source] StateError),
}

/// Completion of one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyProgress {
    /// Week number
    pub week_number: u32,
    /// Week title
    pub title: String,
    /// Rounded percentage, 0..=100
    pub percent_complete: u8,
}

/// Planned start of one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    /// Week number
    pub week_number: u32,
    /// Week title
    pub title: String,
    /// Start date plus seven days per preceding week
    pub computed_start_date: Time,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// The snapshot the values were derived from
    pub state: ProgressState,
    /// Per-week completion in catalog order
    pub weekly: Vec<WeeklyProgress>,
    /// Rounded mean of the weekly percentages
    pub overall: u8,
    /// Weekly calendar in catalog order
    pub schedule: Vec<ScheduleEntry>,
    /// When the last week ends
    pub ends_at: Time,
}

/// `round(100 * num / den)` with halves rounded up, in integer arithmetic.
fn rounded_percent(num: u64, den: u64) -> u8 {
    debug_assert!(den > 0 && num <= 100 * den);
    ((2 * num + den) / (2 * den)) as u8
}

/// Percentage of a week's tasks marked done.
///
/// 1 of 3 gives 33, 2 of 3 gives 67, 1 of 2 gives 50. A week with no tasks
/// is 0. Flags past the week's task count are not counted.
pub fn week_progress(week: &WeekDefinition, state: &ProgressState) -> u8 {
    let total = week.task_count();
    if total == 0 {
        return 0;
    }
    let done = state
        .weeks
        .get(week.week_number)
        .map(|flags| flags.iter().take(total).filter(|done| **done).count())
        .unwrap_or(0);
    rounded_percent(100 * done as u64, total as u64)
}

/// Per-week completion in catalog order.
pub fn weekly_progress(catalog: &Catalog, state: &ProgressState) -> Vec<WeeklyProgress> {
    catalog
        .iter()
        .map(|week| WeeklyProgress {
            week_number: week.week_number,
            title: week.title.clone(),
            percent_complete: week_progress(week, state),
        })
        .collect()
}

/// Rounded mean of the per-week percentages.
pub fn overall_progress(catalog: &Catalog, state: &ProgressState) -> Result<u8, CalcError> {
    if catalog.is_empty() {
        return Err(CalcError::EmptyCatalog);
    }
    let sum: u64 = catalog
        .iter()
        .map(|week| u64::from(week_progress(week, state)))
        .sum();
    Ok(rounded_percent(sum, catalog.len() as u64))
}

/// Planned start of every week: the start date plus `7 * i` days for the
/// week at catalog position `i`.
pub fn schedule(catalog: &Catalog, state: &ProgressState) -> Result<Vec<ScheduleEntry>, CalcError> {
    let start = state.start_time().map_err(CalcError::InvalidStartDate)?;
    Ok(catalog
        .iter()
        .enumerate()
        .map(|(i, week)| ScheduleEntry {
            week_number: week.week_number,
            title: week.title.clone(),
            computed_start_date: start + Duration::days(7 * i as i64),
        })
        .collect())
}

/// End of the last scheduled week.
pub fn schedule_end(catalog: &Catalog, state: &ProgressState) -> Result<Time, CalcError> {
    let start = state.start_time().map_err(CalcError::InvalidStartDate)?;
    Ok(start + Duration::days(7 * catalog.len() as i64))
}

/// The week whose scheduled slot contains `now`, if any.
pub fn current_week(
    catalog: &Catalog,
    state: &ProgressState,
    now: Time,
) -> Result<Option<u32>, CalcError> {
    let entries = schedule(catalog, state)?;
    Ok(entries
        .iter()
        .rev()
        .find(|entry| entry.computed_start_date <= now)
        .filter(|entry| now < entry.computed_start_date + Duration::days(7))
        .map(|entry| entry.week_number))
}

/// Derive the full renderer input for a snapshot.
pub fn dashboard(catalog: &Catalog, state: &ProgressState) -> Result<Dashboard, CalcError> {
    Ok(Dashboard {
        weekly: weekly_progress(catalog, state),
        overall: overall_progress(catalog, state)?,
        schedule: schedule(catalog, state)?,
        ends_at: schedule_end(catalog, state)?,
        state: state.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roadmap_core::WeekDefinition;

    fn start() -> Time {
        Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap()
    }

    fn fresh(catalog: &Catalog) -> ProgressState {
        ProgressState::defaults(catalog, "tester", start())
    }

    fn week_with(n: usize) -> WeekDefinition {
        WeekDefinition::new(1, "w", (0..n).map(|i| format!("task {i}")))
    }

    fn state_for(week: &WeekDefinition, flags: Vec<bool>) -> ProgressState {
        let catalog = Catalog::new(vec![week.clone()]).unwrap();
        let mut state = fresh(&catalog);
        state.weeks.insert(week.week_number, flags);
        state
    }

    #[test]
    fn test_rounding_edge_cases() {
        let three = week_with(3);
        assert_eq!(week_progress(&three, &state_for(&three, vec![true, false, false])), 33);
        assert_eq!(week_progress(&three, &state_for(&three, vec![true, true, false])), 67);

        let two = week_with(2);
        assert_eq!(week_progress(&two, &state_for(&two, vec![true, false])), 50);

        let eight = week_with(8);
        let mut flags = vec![false; 8];
        flags[0] = true;
        // 12.5 rounds up
        assert_eq!(week_progress(&eight, &state_for(&eight, flags)), 13);
    }

    #[test]
    fn test_zero_and_full() {
        let five = week_with(5);
        assert_eq!(week_progress(&five, &state_for(&five, vec![false; 5])), 0);
        assert_eq!(week_progress(&five, &state_for(&five, vec![true; 5])), 100);
    }

    #[test]
    fn test_week_progress_bounds_for_all_counts() {
        for total in 1..=10 {
            let week = week_with(total);
            for done in 0..=total {
                let flags: Vec<bool> = (0..total).map(|i| i < done).collect();
                let pct = week_progress(&week, &state_for(&week, flags));
                assert!(pct <= 100);
                assert_eq!(pct == 0, done == 0, "total={total} done={done}");
                assert_eq!(pct == 100, done == total, "total={total} done={done}");
            }
        }
    }

    #[test]
    fn test_empty_week_is_zero() {
        let empty = WeekDefinition::new(1, "w", Vec::<String>::new());
        let state = state_for(&empty, Vec::new());
        assert_eq!(week_progress(&empty, &state), 0);
    }

    #[test]
    fn test_missing_or_long_flags() {
        let three = week_with(3);
        let catalog = Catalog::new(vec![three.clone()]).unwrap();
        let mut state = fresh(&catalog);

        state.weeks = Default::default();
        assert_eq!(week_progress(&three, &state), 0);

        state.weeks.insert(1, vec![true; 6]);
        assert_eq!(week_progress(&three, &state), 100);
    }

    #[test]
    fn test_overall_one_week_of_twelve() {
        let catalog = Catalog::roadmap();
        let mut state = fresh(&catalog);
        state.weeks.insert(7, vec![true; 5]);
        assert_eq!(overall_progress(&catalog, &state).unwrap(), 8);
    }

    #[test]
    fn test_overall_is_mean_of_rounded_weeks() {
        let catalog = Catalog::new(vec![
            WeekDefinition::new(1, "a", ["x", "y", "z"]),
            WeekDefinition::new(2, "b", ["x", "y"]),
        ])
        .unwrap();
        let mut state = fresh(&catalog);
        state.weeks.insert(1, vec![true, false, false]);
        state.weeks.insert(2, vec![true, false]);
        // (33 + 50) / 2 = 41.5
        assert_eq!(overall_progress(&catalog, &state).unwrap(), 42);

        let weekly = weekly_progress(&catalog, &state);
        assert_eq!(weekly.iter().map(|w| w.percent_complete).collect::<Vec<_>>(), vec![33, 50]);
    }

    #[test]
    fn test_overall_empty_catalog() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        let state = fresh(&catalog);
        assert_eq!(overall_progress(&catalog, &state), Err(CalcError::EmptyCatalog));
    }

    #[test]
    fn test_schedule_weekly_offsets() {
        let catalog = Catalog::roadmap();
        let mut state = fresh(&catalog);
        state.weeks.insert(3, vec![true; 5]);

        let entries = schedule(&catalog, &state).unwrap();
        assert_eq!(entries.len(), 12);
        for (i, entry) in entries.iter().enumerate() {
            assert_eq!(entry.week_number as usize, i + 1);
            assert_eq!(entry.computed_start_date, start() + Duration::days(7 * i as i64));
        }
        assert_eq!(entries[11].computed_start_date, start() + Duration::days(77));
        assert_eq!(schedule_end(&catalog, &state).unwrap(), start() + Duration::days(84));
    }

    #[test]
    fn test_schedule_ignores_flags() {
        let catalog = Catalog::roadmap();
        let state = fresh(&catalog);
        let mut done = state.clone();
        done.weeks.insert(1, vec![true; 5]);
        assert_eq!(schedule(&catalog, &state).unwrap(), schedule(&catalog, &done).unwrap());
    }

    #[test]
    fn test_schedule_rejects_bad_start() {
        let catalog = Catalog::roadmap();
        let mut state = fresh(&catalog);
        state.start_date = "someday".to_string();
        assert!(matches!(
            schedule(&catalog, &state),
            Err(CalcError::InvalidStartDate(StateError::InvalidStartDate { .. }))
        ));
        assert!(dashboard(&catalog, &state).is_err());
    }

    #[test]
    fn test_current_week() {
        let catalog = Catalog::roadmap();
        let state = fresh(&catalog);

        assert_eq!(current_week(&catalog, &state, start() - Duration::days(1)).unwrap(), None);
        assert_eq!(current_week(&catalog, &state, start()).unwrap(), Some(1));
        assert_eq!(current_week(&catalog, &state, start() + Duration::days(15)).unwrap(), Some(3));
        assert_eq!(current_week(&catalog, &state, start() + Duration::days(84)).unwrap(), None);
    }

    #[test]
    fn test_dashboard_bundle() {
        let catalog = Catalog::roadmap();
        let mut state = fresh(&catalog);
        state.weeks.insert(1, vec![true; 5]);

        let dash = dashboard(&catalog, &state).unwrap();
        assert_eq!(dash.state, state);
        assert_eq!(dash.weekly.len(), 12);
        assert_eq!(dash.weekly[0].percent_complete, 100);
        assert_eq!(dash.overall, 8);
        assert_eq!(dash.schedule.len(), 12);
    }
}
