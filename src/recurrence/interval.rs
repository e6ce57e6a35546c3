//! How often a recurring transaction happens and the calendar arithmetic for
//! stepping along its schedule.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month};

use crate::Error;

/// How often a recurring expense or income happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// Every seven days.
    Weekly,
    /// Every calendar month, on the same day of the month where possible.
    Monthly,
    /// Every calendar year, on the same month and day where possible.
    Annually,
}

impl Interval {
    /// All the intervals in ascending order of length.
    pub const ALL: [Interval; 3] = [Interval::Weekly, Interval::Monthly, Interval::Annually];

    /// The literal used for this interval in the API and the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Interval::Weekly => "Weekly",
            Interval::Monthly => "Monthly",
            Interval::Annually => "Annually",
        }
    }

    /// The smallest number of days a single step of this interval can span.
    ///
    /// Month and year steps vary in length, so this is the shortest month (28
    /// days) and the shortest year (365 days).
    pub fn min_step_days(self) -> i64 {
        match self {
            Interval::Weekly => 7,
            Interval::Monthly => 28,
            Interval::Annually => 365,
        }
    }

    /// Get occurrence `n` of a schedule that starts on `start`.
    ///
    /// Occurrence 0 is `start` itself. Month and year steps keep the day of the
    /// month of `start` and clamp it to the last day of shorter months, e.g.
    /// a schedule starting on 31 January gives 29 February (in a leap year),
    /// 31 March, 30 April and so on. Every occurrence is computed from `start`
    /// so the clamping never accumulates.
    ///
    /// Returns `None` if the occurrence falls outside the range of [Date].
    pub fn nth_occurrence(self, start: Date, n: u32) -> Option<Date> {
        match self {
            Interval::Weekly => start.checked_add(Duration::weeks(i64::from(n))),
            Interval::Monthly => add_months(start, n),
            Interval::Annually => add_months(start, n.checked_mul(12)?),
        }
    }

    /// Move `date` forward by one interval, clamping month and year steps to the
    /// last day of a shorter month.
    ///
    /// Returns `None` if the result is outside the range of [Date].
    pub fn step(self, date: Date) -> Option<Date> {
        match self {
            Interval::Weekly => date.checked_add(Duration::weeks(1)),
            Interval::Monthly => add_months(date, 1),
            Interval::Annually => add_months(date, 12),
        }
    }

    /// An index `i` such that occurrence `i` of the schedule starting on `start`
    /// is on or before `target`.
    ///
    /// The estimate is at most a couple of steps short of the first occurrence
    /// on or after `target`, so callers only need a short, bounded walk forward.
    pub(crate) fn index_lower_bound(self, start: Date, target: Date) -> u32 {
        if target <= start {
            return 0;
        }

        let estimate = match self {
            Interval::Weekly => (target - start).whole_days() / 7,
            Interval::Monthly => months_between(start, target) - 1,
            Interval::Annually => i64::from(target.year() - start.year()) - 1,
        };

        u32::try_from(estimate.max(0)).unwrap_or(u32::MAX)
    }

    /// The number of occurrences needed to be sure that `months` calendar
    /// months are covered.
    ///
    /// This deliberately over-counts, e.g. weekly schedules assume five
    /// occurrences every month.
    pub fn occurrences_to_cover(self, months: u32) -> usize {
        let months = months as usize;

        match self {
            Interval::Weekly => months * 5 + 1,
            Interval::Monthly => months + 1,
            Interval::Annually => months / 12 + 1,
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = Error;

    /// Parse one of the exact literals "Weekly", "Monthly" or "Annually".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Weekly" => Ok(Interval::Weekly),
            "Monthly" => Ok(Interval::Monthly),
            "Annually" => Ok(Interval::Annually),
            other => Err(Error::InvalidInterval(other.to_owned())),
        }
    }
}

/// Add `months` calendar months to `date`, clamping the day of the month to the
/// last day of the resulting month.
///
/// Returns `None` if the result is outside the range of [Date].
pub fn add_months(date: Date, months: u32) -> Option<Date> {
    let month_index = i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1;
    let target_index = month_index.checked_add(i64::from(months))?;

    let year = i32::try_from(target_index.div_euclid(12)).ok()?;
    let month = Month::try_from((target_index.rem_euclid(12) + 1) as u8).ok()?;
    let day = date.day().min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).ok()
}

/// The number of whole calendar months from the month of `from` to the month
/// of `to`, ignoring the day of the month.
fn months_between(from: Date, to: Date) -> i64 {
    let years = i64::from(to.year()) - i64::from(from.year());
    let months = i64::from(u8::from(to.month())) - i64::from(u8::from(from.month()));

    years * 12 + months
}

/// The number of days in `month` of `year`.
pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
