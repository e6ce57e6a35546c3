//! Recurring expenses and incomes, and the projection of their schedules onto
//! concrete dates.

mod breakdown;
mod category;
mod interval;
mod projector;
mod rule;

pub use breakdown::{MonthlyBreakdown, RecurringBreakdown, breakdown_for_month};
pub use category::{Category, CategoryPolicy, HasCategory, NoCategory, TransactionKind};
pub(crate) use category::{category_is_absent, serialize_category};
pub use interval::{Interval, add_months, last_day_of_month};
pub use projector::{
    MAX_MONTHS_AHEAD, MAX_OCCURRENCES_PER_MONTH, ProjectionError, next_occurrences,
    occurrences_in_month, project_for_window,
};
pub use rule::{
    Occurrence, RecurrenceRule, RecurrenceRuleId, RecurringExpense, RecurringIncome,
};

#[cfg(test)]
pub(crate) use projector::test_rules;
