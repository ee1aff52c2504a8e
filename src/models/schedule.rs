//! Revision scheduling: converts an interval + unit into an absolute next
//! due date, and the reverse "due in X" display computation.
//!
//! Units use fixed lengths (a month is a 30-day approximation, not
//! calendar-aware), so the arithmetic is exact millisecond addition.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AppError, Result};

/// Time units available for revision intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

/// Units ordered largest to smallest, for greedy display reduction.
const DISPLAY_ORDER: [RevisionUnit; 6] = [
    RevisionUnit::Months,
    RevisionUnit::Weeks,
    RevisionUnit::Days,
    RevisionUnit::Hours,
    RevisionUnit::Minutes,
    RevisionUnit::Seconds,
];

impl RevisionUnit {
    /// All units, smallest to largest.
    pub const ALL: [RevisionUnit; 6] = [
        RevisionUnit::Seconds,
        RevisionUnit::Minutes,
        RevisionUnit::Hours,
        RevisionUnit::Days,
        RevisionUnit::Weeks,
        RevisionUnit::Months,
    ];

    /// Fixed unit length in milliseconds.
    pub fn millis(self) -> i64 {
        match self {
            RevisionUnit::Seconds => 1_000,
            RevisionUnit::Minutes => 60 * 1_000,
            RevisionUnit::Hours => 60 * 60 * 1_000,
            RevisionUnit::Days => 24 * 60 * 60 * 1_000,
            RevisionUnit::Weeks => 7 * 24 * 60 * 60 * 1_000,
            RevisionUnit::Months => 30 * 24 * 60 * 60 * 1_000,
        }
    }

    /// Stored document name for the unit.
    pub fn name(self) -> &'static str {
        match self {
            RevisionUnit::Seconds => "seconds",
            RevisionUnit::Minutes => "minutes",
            RevisionUnit::Hours => "hours",
            RevisionUnit::Days => "days",
            RevisionUnit::Weeks => "weeks",
            RevisionUnit::Months => "months",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        DISPLAY_ORDER.into_iter().find(|u| u.name() == name)
    }

    /// "1 day", "3 days", ...
    fn label(self, value: i64) -> String {
        // name() is the plural form; drop the trailing 's' for one
        let plural = self.name();
        if value == 1 {
            format!("1 {}", &plural[..plural.len() - 1])
        } else {
            format!("{} {}", value, plural)
        }
    }
}

/// How far a reviewed card's next due date gets pushed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionSetting {
    pub interval: i64,
    pub unit: RevisionUnit,
}

impl RevisionSetting {
    pub fn new(interval: i64, unit: RevisionUnit) -> Result<Self> {
        if interval <= 0 {
            return Err(AppError::InvalidInterval(interval));
        }
        Ok(Self { interval, unit })
    }

    pub fn next_due(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        next_due_date(self.interval, self.unit, now)
    }
}

impl Default for RevisionSetting {
    fn default() -> Self {
        Self {
            interval: 1,
            unit: RevisionUnit::Days,
        }
    }
}

impl fmt::Display for RevisionSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "every {}", self.unit.label(self.interval))
    }
}

/// Absolute due date `interval` units after `now`.
pub fn next_due_date(
    interval: i64,
    unit: RevisionUnit,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    if interval <= 0 {
        return Err(AppError::InvalidInterval(interval));
    }
    Ok(now + Duration::milliseconds(interval * unit.millis()))
}

/// Time remaining until a due date, reduced to the largest whole unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLeft {
    Overdue,
    In { value: i64, unit: RevisionUnit },
}

/// Display-only: never used for scheduling decisions.
pub fn time_until(due: DateTime<Utc>, now: DateTime<Utc>) -> TimeLeft {
    let millis = (due - now).num_milliseconds();
    if millis <= 0 {
        return TimeLeft::Overdue;
    }
    for unit in DISPLAY_ORDER {
        let value = millis / unit.millis();
        if value >= 1 {
            return TimeLeft::In { value, unit };
        }
    }
    // under a second away: floor to zero seconds
    TimeLeft::In {
        value: 0,
        unit: RevisionUnit::Seconds,
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeLeft::Overdue => write!(f, "due now"),
            TimeLeft::In { value, unit } => write!(f, "due in {}", unit.label(*value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_next_due_adds_exact_millis() {
        let now = t0();
        for unit in DISPLAY_ORDER {
            for interval in [1_i64, 2, 17] {
                let due = next_due_date(interval, unit, now).unwrap();
                assert_eq!((due - now).num_milliseconds(), interval * unit.millis());
            }
        }
    }

    #[test]
    fn test_unit_millis_table() {
        assert_eq!(RevisionUnit::Seconds.millis(), 1_000);
        assert_eq!(RevisionUnit::Minutes.millis(), 60_000);
        assert_eq!(RevisionUnit::Hours.millis(), 3_600_000);
        assert_eq!(RevisionUnit::Days.millis(), 86_400_000);
        assert_eq!(RevisionUnit::Weeks.millis(), 604_800_000);
        assert_eq!(RevisionUnit::Months.millis(), 2_592_000_000);
    }

    #[test]
    fn test_non_positive_interval_rejected() {
        let now = t0();
        assert!(matches!(
            next_due_date(0, RevisionUnit::Days, now),
            Err(AppError::InvalidInterval(0))
        ));
        assert!(matches!(
            next_due_date(-3, RevisionUnit::Hours, now),
            Err(AppError::InvalidInterval(-3))
        ));
        assert!(RevisionSetting::new(0, RevisionUnit::Minutes).is_err());
    }

    #[test]
    fn test_time_until_overdue_at_or_before_now() {
        let now = t0();
        assert_eq!(time_until(now, now), TimeLeft::Overdue);
        assert_eq!(time_until(now - Duration::days(2), now), TimeLeft::Overdue);
    }

    #[test]
    fn test_time_until_floors_to_largest_whole_unit() {
        let now = t0();
        // 90 seconds is one full minute, remainder discarded
        assert_eq!(
            time_until(now + Duration::seconds(90), now),
            TimeLeft::In {
                value: 1,
                unit: RevisionUnit::Minutes
            }
        );
        assert_eq!(
            time_until(now + Duration::seconds(59), now),
            TimeLeft::In {
                value: 59,
                unit: RevisionUnit::Seconds
            }
        );
        // 29 days is not yet a month
        assert_eq!(
            time_until(now + Duration::days(29), now),
            TimeLeft::In {
                value: 4,
                unit: RevisionUnit::Weeks
            }
        );
        assert_eq!(
            time_until(now + Duration::days(30), now),
            TimeLeft::In {
                value: 1,
                unit: RevisionUnit::Months
            }
        );
    }

    #[test]
    fn test_labels_singular_and_plural() {
        let now = t0();
        assert_eq!(
            time_until(now + Duration::days(1), now).to_string(),
            "due in 1 day"
        );
        assert_eq!(
            time_until(now + Duration::days(3), now).to_string(),
            "due in 3 days"
        );
        assert_eq!(time_until(now, now).to_string(), "due now");
        assert_eq!(
            RevisionSetting::new(2, RevisionUnit::Weeks).unwrap().to_string(),
            "every 2 weeks"
        );
    }

    #[test]
    fn test_unit_names_round_trip() {
        for unit in DISPLAY_ORDER {
            assert_eq!(RevisionUnit::from_name(unit.name()), Some(unit));
        }
        assert_eq!(RevisionUnit::from_name("fortnights"), None);
    }
}
