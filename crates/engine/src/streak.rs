//! Streak tracking
//!
//! Calendar-day boundaries use UTC dates throughout. Two activities on
//! the same UTC day leave the streak untouched; an activity exactly one
//! day after the last extends it; any longer gap resets it to 1.

use chrono::{DateTime, Utc};
use common::models::Streak;

/// What happened to a streak when an activity landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// First recorded activity ever
    Started,
    /// Same UTC day as the previous activity
    Unchanged,
    /// Exactly one day after the previous activity
    Extended,
    /// More than one day elapsed
    Reset,
}

impl StreakChange {
    /// Whether this activity landed on a UTC day with no prior activity
    pub fn is_new_day(&self) -> bool {
        !matches!(self, StreakChange::Unchanged)
    }
}

/// Advance a streak for an activity at `now`.
///
/// Always stamps `last_activity = now` and keeps `longest` current.
pub fn advance(streak: &Streak, now: DateTime<Utc>) -> (Streak, StreakChange) {
    let today = now.date_naive();
    let mut next = streak.clone();

    let change = match streak.last_activity {
        None => {
            next.current = 1;
            StreakChange::Started
        }
        Some(last) => {
            let last_day = last.date_naive();
            if last_day == today {
                StreakChange::Unchanged
            } else if last_day.succ_opt() == Some(today) {
                next.current += 1;
                StreakChange::Extended
            } else {
                next.current = 1;
                StreakChange::Reset
            }
        }
    };

    next.longest = next.longest.max(next.current);
    next.last_activity = Some(now);
    (next, change)
}
