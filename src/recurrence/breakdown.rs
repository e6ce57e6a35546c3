//! Monthly totals that combine one-time transactions with recurring ones.

use serde::Serialize;
use time::Month;

use crate::recurrence::{
    CategoryPolicy, Interval, ProjectionError, RecurrenceRule, occurrences_in_month,
};

/// The recurring part of a monthly total split by interval.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct RecurringBreakdown {
    /// The total from weekly rules.
    pub weekly: f64,
    /// The total from monthly rules.
    pub monthly: f64,
    /// The total from annual rules.
    pub annually: f64,
}

impl RecurringBreakdown {
    fn add(&mut self, interval: Interval, amount: f64) {
        match interval {
            Interval::Weekly => self.weekly += amount,
            Interval::Monthly => self.monthly += amount,
            Interval::Annually => self.annually += amount,
        }
    }
}

/// The expenses or incomes of a single calendar month.
///
/// Amounts are not rounded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    /// The sum of the one-time transactions in the month.
    pub one_time_total: f64,
    /// The number of one-time transactions in the month.
    pub one_time_count: usize,
    /// The sum of every occurrence of the active rules in the month.
    pub recurring_total: f64,
    /// The number of active rules that occur at least once in the month.
    pub active_recurring_count: usize,
    /// [MonthlyBreakdown::recurring_total] split by interval.
    pub recurring_breakdown: RecurringBreakdown,
    /// The one-time total plus the recurring total.
    pub total: f64,
}

/// Total the one-time amounts and the occurrences of the active `rules` in
/// `month` of `year`.
///
/// `one_time_amounts` are trusted to already be restricted to the month.
/// Inactive rules are skipped.
///
/// # Errors
///
/// Returns [ProjectionError] if any active rule cannot be projected.
pub fn breakdown_for_month<'a, C>(
    one_time_amounts: impl IntoIterator<Item = f64>,
    rules: impl IntoIterator<Item = &'a RecurrenceRule<C>>,
    month: Month,
    year: i32,
) -> Result<MonthlyBreakdown, ProjectionError>
where
    C: CategoryPolicy,
{
    let mut breakdown = MonthlyBreakdown::default();

    for amount in one_time_amounts {
        breakdown.one_time_total += amount;
        breakdown.one_time_count += 1;
    }

    for rule in rules.into_iter().filter(|rule| rule.is_active) {
        let count = occurrences_in_month(rule, month, year)?;

        if count == 0 {
            continue;
        }

        let amount = rule.amount.as_f64() * f64::from(count);
        breakdown.recurring_total += amount;
        breakdown.recurring_breakdown.add(rule.interval, amount);
        breakdown.active_recurring_count += 1;
    }

    breakdown.total = breakdown.one_time_total + breakdown.recurring_total;

    Ok(breakdown)
}
