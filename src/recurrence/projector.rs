//! Computes the concrete dates that a recurrence rule implies.
//!
//! Everything here is pure: the current date is always passed in and nothing
//! touches the database or the clock.

use std::cmp::max;

use time::{Date, Month};

use crate::recurrence::{
    CategoryPolicy, Interval, Occurrence, RecurrenceRule,
    interval::{add_months, last_day_of_month},
};

/// The most occurrences a single rule may have in one calendar month.
///
/// A weekly rule has at most five, the extra headroom only matters if a
/// schedule is broken.
pub const MAX_OCCURRENCES_PER_MONTH: u32 = 8;

/// The furthest ahead, in months, that [project_for_window] will look.
pub const MAX_MONTHS_AHEAD: u32 = 120;

/// How many steps past the estimated index the schedule may be walked to find
/// the first occurrence on or after a date.
const CATCH_UP_LIMIT: u32 = 16;

/// The errors that may occur while projecting a recurrence rule.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ProjectionError {
    /// A loop over the schedule did not finish within its bound.
    #[error("gave up projecting the schedule after {0} iterations")]
    IterationLimit(u32),

    /// A date in the schedule fell outside the supported calendar range.
    #[error("the schedule left the supported range of dates")]
    DateOutOfRange,
}

/// Count how many times `rule` occurs in `month` of `year`.
///
/// Counting starts from the later of the rule's start date and the first day
/// of the month and steps by the rule's interval until it leaves the month. A
/// weekly rule counts four or five times, monthly and annual rules count once.
///
/// Returns 0 when the rule starts after the end of the month. The active flag
/// is not checked here, see [crate::recurrence::breakdown_for_month].
///
/// # Errors
///
/// Returns [ProjectionError] if the month is outside the supported range of
/// dates or the schedule cannot be walked within its bound.
pub fn occurrences_in_month<C: CategoryPolicy>(
    rule: &RecurrenceRule<C>,
    month: Month,
    year: i32,
) -> Result<u32, ProjectionError> {
    count_occurrences_in_month(
        rule.interval,
        rule.start_date,
        month,
        year,
        MAX_OCCURRENCES_PER_MONTH,
    )
}

fn count_occurrences_in_month(
    interval: Interval,
    start_date: Date,
    month: Month,
    year: i32,
    limit: u32,
) -> Result<u32, ProjectionError> {
    debug_assert!(interval.min_step_days() > 0);

    let first_of_month =
        Date::from_calendar_date(year, month, 1).map_err(|_| ProjectionError::DateOutOfRange)?;
    let last_of_month = first_of_month
        .replace_day(last_day_of_month(year, month))
        .map_err(|_| ProjectionError::DateOutOfRange)?;

    if start_date > last_of_month {
        return Ok(0);
    }

    let mut cursor = max(start_date, first_of_month);
    let mut count = 0;

    // Every cursor date is on or after the first of the month, so any date not
    // past the end of the month is in it.
    while cursor <= last_of_month {
        if count == limit {
            return Err(ProjectionError::IterationLimit(limit));
        }

        count += 1;

        let Some(next) = interval.step(cursor) else {
            break;
        };
        cursor = next;
    }

    Ok(count)
}

/// Get the next `count` dates of `rule` that fall strictly after `today`.
///
/// The dates are in ascending order. If the rule has not started yet, the
/// first date is its start date. A `count` of zero gives an empty list.
///
/// # Errors
///
/// Returns [ProjectionError] if the schedule cannot be caught up to `today`
/// within its bound.
pub fn next_occurrences<C: CategoryPolicy>(
    rule: &RecurrenceRule<C>,
    count: usize,
    today: Date,
) -> Result<Vec<Date>, ProjectionError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let Some(tomorrow) = today.next_day() else {
        return Ok(Vec::new());
    };

    let Some(first_index) =
        first_index_on_or_after(rule.interval, rule.start_date, tomorrow, CATCH_UP_LIMIT)?
    else {
        return Ok(Vec::new());
    };

    // Dates past the end of the calendar end the list early.
    let dates = (0..count)
        .map_while(|offset| {
            let index = first_index.checked_add(u32::try_from(offset).ok()?)?;
            rule.interval.nth_occurrence(rule.start_date, index)
        })
        .collect();

    Ok(dates)
}

/// Project the occurrences of `rule` from tomorrow up to and including the
/// date `months_ahead` calendar months after `today`.
///
/// `months_ahead` is capped at [MAX_MONTHS_AHEAD]. The same rule and `today`
/// always give the same occurrences.
///
/// # Errors
///
/// Returns [ProjectionError] if the schedule cannot be walked within its bound.
pub fn project_for_window<C: CategoryPolicy>(
    rule: &RecurrenceRule<C>,
    months_ahead: u32,
    today: Date,
) -> Result<Vec<Occurrence>, ProjectionError> {
    let months_ahead = months_ahead.min(MAX_MONTHS_AHEAD);
    let window_end = add_months(today, months_ahead).ok_or(ProjectionError::DateOutOfRange)?;

    let candidates = next_occurrences(
        rule,
        rule.interval.occurrences_to_cover(months_ahead),
        today,
    )?;

    let occurrences = candidates
        .into_iter()
        .take_while(|date| *date <= window_end)
        .enumerate()
        .map(|(position, date)| Occurrence::new(rule, position, date))
        .collect();

    Ok(occurrences)
}

/// Find the index of the first occurrence of the schedule on or after `target`.
///
/// Jumps to an estimate of the index and then walks forward at most `limit`
/// steps. Returns `None` if the schedule runs past the last supported date
/// before reaching `target`.
fn first_index_on_or_after(
    interval: Interval,
    start_date: Date,
    target: Date,
    limit: u32,
) -> Result<Option<u32>, ProjectionError> {
    debug_assert!(interval.min_step_days() > 0);

    let mut index = interval.index_lower_bound(start_date, target);

    for _ in 0..=limit {
        let Some(date) = interval.nth_occurrence(start_date, index) else {
            return Ok(None);
        };

        if date >= target {
            return Ok(Some(index));
        }

        let Some(next_index) = index.checked_add(1) else {
            return Ok(None);
        };
        index = next_index;
    }

    Err(ProjectionError::IterationLimit(limit))
}


#[cfg(test)]
mod occurrences_in_month_tests {
    use time::{Month, macros::date};

    use crate::recurrence::{Interval, ProjectionError, occurrences_in_month};

    use super::{count_occurrences_in_month, test_rules::expense_rule};

    #[test]
    fn monthly_rule_occurs_once_in_following_month() {
        let rule = expense_rule(100.0, Interval::Monthly, date!(2024 - 01 - 15));

        assert_eq!(occurrences_in_month(&rule, Month::February, 2024), Ok(1));
    }

    #[test]
    fn weekly_rule_occurs_five_times_in_january_2024() {
        let rule = expense_rule(50.0, Interval::Weekly, date!(2024 - 01 - 01));

        assert_eq!(occurrences_in_month(&rule, Month::January, 2024), Ok(5));
    }

    #[test]
    fn weekly_rule_counts_from_first_of_month() {
        // Counted on 1, 8, 15, 22 and 29 February, whatever the start weekday.
        for start in [date!(2024 - 01 - 01), date!(2024 - 01 - 03)] {
            let rule = expense_rule(50.0, Interval::Weekly, start);

            assert_eq!(occurrences_in_month(&rule, Month::February, 2024), Ok(5));
        }
    }

    #[test]
    fn weekly_rule_in_common_february_counts_four() {
        let rule = expense_rule(50.0, Interval::Weekly, date!(2022 - 06 - 01));

        assert_eq!(occurrences_in_month(&rule, Month::February, 2023), Ok(4));
    }

    #[test]
    fn weekly_rule_counts_from_start_date_in_start_month() {
        // 20 and 27 January.
        let rule = expense_rule(50.0, Interval::Weekly, date!(2024 - 01 - 20));

        assert_eq!(occurrences_in_month(&rule, Month::January, 2024), Ok(2));
    }

    #[test]
    fn annual_rule_counts_once_in_every_month_after_start() {
        let rule = expense_rule(1200.0, Interval::Annually, date!(2023 - 03 - 10));

        assert_eq!(occurrences_in_month(&rule, Month::March, 2023), Ok(1));
        assert_eq!(occurrences_in_month(&rule, Month::March, 2024), Ok(1));
        assert_eq!(occurrences_in_month(&rule, Month::April, 2024), Ok(1));
        assert_eq!(occurrences_in_month(&rule, Month::February, 2023), Ok(0));
    }

    #[test]
    fn zero_for_every_month_before_start() {
        let start = date!(2024 - 06 - 20);

        for interval in Interval::ALL {
            let rule = expense_rule(10.0, interval, start);

            for month in [Month::January, Month::March, Month::May] {
                assert_eq!(
                    occurrences_in_month(&rule, month, 2024),
                    Ok(0),
                    "{interval} rule counted in {month} before it started"
                );
            }
            assert_eq!(occurrences_in_month(&rule, Month::June, 2023), Ok(0));
        }
    }

    #[test]
    fn at_least_one_in_start_month() {
        let start = date!(2024 - 06 - 30);

        for interval in Interval::ALL {
            let rule = expense_rule(10.0, interval, start);

            assert!(occurrences_in_month(&rule, Month::June, 2024).unwrap() >= 1);
        }
    }

    #[test]
    fn month_end_rule_never_skips_a_month() {
        let rule = expense_rule(10.0, Interval::Monthly, date!(2024 - 01 - 31));

        for month in [
            Month::February,
            Month::March,
            Month::April,
            Month::May,
            Month::June,
            Month::September,
            Month::November,
        ] {
            assert_eq!(
                occurrences_in_month(&rule, month, 2024),
                Ok(1),
                "expected one occurrence in {month}"
            );
        }
        assert_eq!(occurrences_in_month(&rule, Month::February, 2025), Ok(1));
    }

    #[test]
    fn leap_day_rule_occurs_on_february_28_in_common_years() {
        let rule = expense_rule(10.0, Interval::Annually, date!(2024 - 02 - 29));

        assert_eq!(occurrences_in_month(&rule, Month::February, 2025), Ok(1));
        assert_eq!(occurrences_in_month(&rule, Month::February, 2028), Ok(1));
    }

    #[test]
    fn counts_far_after_start() {
        let rule = expense_rule(10.0, Interval::Weekly, date!(2000 - 01 - 03));

        // 1, 8, 15, 22 and 29 December.
        assert_eq!(occurrences_in_month(&rule, Month::December, 2030), Ok(5));
    }

    #[test]
    fn hitting_the_bound_is_an_error() {
        let result = count_occurrences_in_month(
            Interval::Weekly,
            date!(2024 - 01 - 01),
            Month::January,
            2024,
            2,
        );

        assert_eq!(result, Err(ProjectionError::IterationLimit(2)));
    }

    #[test]
    fn month_outside_calendar_is_an_error() {
        let rule = expense_rule(10.0, Interval::Monthly, date!(2024 - 01 - 01));

        assert_eq!(
            occurrences_in_month(&rule, Month::January, 1_000_000),
            Err(ProjectionError::DateOutOfRange)
        );
    }
}
