//! Clock abstraction and timestamp formatting.

use chrono::{SecondsFormat, Utc};

use crate::Time;

/// Source of "now" for defaulted state, so tests can pin the start date.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    /// Real system time
    #[default]
    System,
    /// Always returns the given instant
    Fixed(Time),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    pub fn fixed(at: Time) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    pub fn now(&self) -> Time {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Format a timestamp the way browsers print `Date.toISOString()`:
/// millisecond precision with a trailing `Z`.
pub fn format_iso(at: Time) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
