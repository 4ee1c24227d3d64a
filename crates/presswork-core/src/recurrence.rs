//! # Recurrence Engine
//!
//! Date stepping for recurring expenses: given a recurrence definition and
//! the previous occurrence date, computes when the next occurrence falls
//! due, plus the day-offset reminder check used by the sweep.
//!
//! ## Stepping Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frequency   ×   Rule                  →  Next date                    │
//! │                                                                         │
//! │  weekly          same_day / d-o-m      →  previous + 7 days            │
//! │  weekly          day_of_week(Fri)      →  next Friday strictly after   │
//! │  monthly         same_day              →  previous + 1 month (clamped) │
//! │  monthly         day_of_month(31)      →  Feb 29 / Feb 28 etc.         │
//! │  monthly         weekday_of_month(2,Tu)→  2nd Tuesday of next month    │
//! │  quarterly       (as monthly, +3)                                      │
//! │  yearly          (as monthly, +12)                                     │
//! │                                                                         │
//! │  Day-of-month past the month's length clamps to the last day.          │
//! │  Week 5 (or higher) means "last such weekday of the month".            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The computed date is always STRICTLY after the input date; a template
//! whose stored next date has lagged behind is advanced repeatedly by
//! [`Recurrence::next_after`] until it clears today.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

// =============================================================================
// Definitions
// =============================================================================

/// How often a recurring expense repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceFrequency {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

/// Which day within the period the occurrence falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceRule {
    /// Keep the day of the previous occurrence (clamped by month length).
    SameDay,
    /// A fixed day of the month, 1-31; clamps to the month's last day.
    DayOfMonth(u32),
    /// A weekday. For weekly frequency: the next such weekday. For
    /// month-based frequencies this resolves as the FIRST such weekday of
    /// the target month.
    DayOfWeek(Weekday),
    /// The nth weekday of the month (week 1-4; 5 or more means last).
    WeekdayOfMonth { week: u32, weekday: Weekday },
}

/// A complete recurrence definition, stored on the expense template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    pub rule: RecurrenceRule,
}

impl Recurrence {
    /// Computes the occurrence following `after`. The result is always
    /// strictly later than `after`.
    pub fn next_occurrence(&self, after: NaiveDate) -> NaiveDate {
        let mut next = self.step(after);
        // Rule resolution within a month cannot move earlier than the
        // month start, so at most one extra step is ever needed.
        while next <= after {
            next = self.step(next);
        }
        next
    }

    /// Advances from `from` until the result is strictly after `today`.
    ///
    /// Used by the sweep when the stored next-occurrence date has fallen
    /// behind (e.g. the job did not run for a while): the template's date
    /// must land in the future again, while only ONE occurrence is created
    /// per sweep run.
    pub fn next_after(&self, from: NaiveDate, today: NaiveDate) -> NaiveDate {
        let mut next = self.next_occurrence(from);
        while next <= today {
            next = self.next_occurrence(next);
        }
        next
    }

    /// One frequency step from `from`, with the rule resolved inside the
    /// target period.
    fn step(&self, from: NaiveDate) -> NaiveDate {
        match self.frequency {
            RecurrenceFrequency::Weekly => match self.rule {
                RecurrenceRule::DayOfWeek(weekday) => next_weekday_after(from, weekday),
                _ => from + Days::new(7),
            },
            RecurrenceFrequency::Monthly => self.resolve_in_month(from + Months::new(1)),
            RecurrenceFrequency::Quarterly => self.resolve_in_month(from + Months::new(3)),
            RecurrenceFrequency::Yearly => self.resolve_in_month(from + Months::new(12)),
        }
    }

    /// Applies the rule within the month of `base`.
    fn resolve_in_month(&self, base: NaiveDate) -> NaiveDate {
        match self.rule {
            // Month addition already clamps the carried day.
            RecurrenceRule::SameDay => base,
            RecurrenceRule::DayOfMonth(day) => clamp_day(base.year(), base.month(), day),
            RecurrenceRule::DayOfWeek(weekday) => {
                nth_weekday_of_month(base.year(), base.month(), 1, weekday)
            }
            RecurrenceRule::WeekdayOfMonth { week, weekday } => {
                nth_weekday_of_month(base.year(), base.month(), week, weekday)
            }
        }
    }
}

// =============================================================================
// Reminders
// =============================================================================

/// Whole days from `today` until `target` (negative if past).
pub fn days_until(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}

/// Whether a reminder is due today for an occurrence on `next`.
///
/// This is a narrow EQUALITY check: the reminder fires only when the gap
/// is exactly `reminder_days`. A sweep that does not run on the matching
/// day skips the reminder silently; that behavior is intentional and
/// relied upon to avoid duplicate reminders on subsequent runs.
pub fn reminder_due(next: NaiveDate, today: NaiveDate, reminder_days: i64) -> bool {
    days_until(today, next) == reminder_days
}

// =============================================================================
// Calendar Helpers
// =============================================================================

/// Number of days in a month.
fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("valid first-of-month")
        .pred_opt()
        .expect("month has a last day")
        .day()
}

/// Builds a date in (year, month), clamping `day` to the month's length.
/// A zero day is treated as the first.
fn clamp_day(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.max(1).min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid")
}

/// The next `weekday` strictly after `from` (1 to 7 days ahead).
fn next_weekday_after(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let gap = (7 + weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64
        - 1)
        .rem_euclid(7)
        + 1;
    from + Days::new(gap as u64)
}

/// The nth `weekday` of a month; `week` values past the month's count
/// (and 5) resolve to the LAST such weekday. A zero week is treated as
/// the first.
fn nth_weekday_of_month(year: i32, month: u32, week: u32, weekday: Weekday) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid first-of-month");
    let offset = (7 + weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let first_match = first + Days::new(offset as u64);

    let week = week.max(1);
    let mut candidate = first_match + Days::new(7 * (week as u64 - 1));
    while candidate.month() != month {
        candidate = candidate - Days::new(7);
    }
    candidate
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_same_day() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Weekly,
            rule: RecurrenceRule::SameDay,
        };
        assert_eq!(
            recurrence.next_occurrence(date(2024, 3, 4)),
            date(2024, 3, 11)
        );
    }

    #[test]
    fn test_weekly_day_of_week() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Weekly,
            rule: RecurrenceRule::DayOfWeek(Weekday::Fri),
        };
        // 2024-03-04 is a Monday; next Friday is 2024-03-08
        assert_eq!(
            recurrence.next_occurrence(date(2024, 3, 4)),
            date(2024, 3, 8)
        );
        // From a Friday, the next Friday is a full week later
        assert_eq!(
            recurrence.next_occurrence(date(2024, 3, 8)),
            date(2024, 3, 15)
        );
    }

    #[test]
    fn test_monthly_same_day_clamps() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::SameDay,
        };
        // Jan 31 + 1 month clamps to Feb 29 (2024 is a leap year)
        assert_eq!(
            recurrence.next_occurrence(date(2024, 1, 31)),
            date(2024, 2, 29)
        );
        assert_eq!(
            recurrence.next_occurrence(date(2023, 1, 31)),
            date(2023, 2, 28)
        );
    }

    #[test]
    fn test_monthly_day_of_month() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(15),
        };
        assert_eq!(
            recurrence.next_occurrence(date(2024, 1, 15)),
            date(2024, 2, 15)
        );
    }

    #[test]
    fn test_monthly_day_of_month_clamps_short_months() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(31),
        };
        assert_eq!(
            recurrence.next_occurrence(date(2024, 1, 31)),
            date(2024, 2, 29)
        );
        // And back out of the short month to the full day
        assert_eq!(
            recurrence.next_occurrence(date(2024, 2, 29)),
            date(2024, 3, 31)
        );
    }

    #[test]
    fn test_monthly_weekday_of_month() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::WeekdayOfMonth {
                week: 2,
                weekday: Weekday::Tue,
            },
        };
        // 2nd Tuesday of Feb 2024 is Feb 13
        assert_eq!(
            recurrence.next_occurrence(date(2024, 1, 9)),
            date(2024, 2, 13)
        );
    }

    #[test]
    fn test_week_five_means_last() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::WeekdayOfMonth {
                week: 5,
                weekday: Weekday::Mon,
            },
        };
        // Feb 2024 has four Mondays; the "5th" resolves to the last (Feb 26)
        assert_eq!(
            recurrence.next_occurrence(date(2024, 1, 29)),
            date(2024, 2, 26)
        );
    }

    #[test]
    fn test_quarterly_and_yearly() {
        let quarterly = Recurrence {
            frequency: RecurrenceFrequency::Quarterly,
            rule: RecurrenceRule::SameDay,
        };
        assert_eq!(
            quarterly.next_occurrence(date(2024, 1, 15)),
            date(2024, 4, 15)
        );

        let yearly = Recurrence {
            frequency: RecurrenceFrequency::Yearly,
            rule: RecurrenceRule::SameDay,
        };
        // Feb 29 of a leap year steps to Feb 28 the next year
        assert_eq!(
            yearly.next_occurrence(date(2024, 2, 29)),
            date(2025, 2, 28)
        );
    }

    #[test]
    fn test_next_occurrence_is_strictly_after() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(1),
        };
        let after = date(2024, 1, 31);
        let next = recurrence.next_occurrence(after);
        assert!(next > after);
        assert_eq!(next, date(2024, 2, 1));
    }

    #[test]
    fn test_next_after_catches_up_over_a_gap() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(10),
        };
        // The stored date lagged three months behind; one call clears today
        let next = recurrence.next_after(date(2024, 1, 10), date(2024, 4, 2));
        assert_eq!(next, date(2024, 4, 10));
        assert!(next > date(2024, 4, 2));
    }

    #[test]
    fn test_days_until_and_reminder_due() {
        let today = date(2024, 3, 1);
        let next = date(2024, 3, 4);

        assert_eq!(days_until(today, next), 3);
        assert!(reminder_due(next, today, 3));
        // Exact match only: neither closer nor farther fires
        assert!(!reminder_due(next, today, 2));
        assert!(!reminder_due(next, today, 4));
        // A past date never matches a non-negative offset
        assert!(!reminder_due(date(2024, 2, 28), today, 2));
    }

    #[test]
    fn test_recurrence_serde_roundtrip() {
        let recurrence = Recurrence {
            frequency: RecurrenceFrequency::Quarterly,
            rule: RecurrenceRule::WeekdayOfMonth {
                week: 1,
                weekday: Weekday::Wed,
            },
        };
        let json = serde_json::to_string(&recurrence).unwrap();
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, recurrence);
    }
}
