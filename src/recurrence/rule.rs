//! Recurring expenses and incomes, and the occurrences projected from them.

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::{
    UserID,
    amount::Amount,
    recurrence::{
        CategoryPolicy, HasCategory, Interval, NoCategory,
        category::{category_is_absent, serialize_category},
    },
    timezone::rfc3339,
};

/// Alias for the integer type used for recurrence rule IDs.
pub type RecurrenceRuleId = i64;

/// An expense or income that repeats on a fixed interval from a start date.
///
/// The category slot `C` is [HasCategory] for expenses and [NoCategory] for
/// incomes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", bound(serialize = "C: CategoryPolicy"))]
pub struct RecurrenceRule<C> {
    /// The ID of the rule in the database.
    pub id: RecurrenceRuleId,
    /// The user that owns the rule.
    #[serde(skip)]
    pub user_id: UserID,
    /// A short, non-empty description, e.g. "Rent".
    pub description: String,
    /// How much money each occurrence is for.
    pub amount: Amount,
    /// The category of expenses, absent for incomes.
    #[serde(
        serialize_with = "serialize_category",
        skip_serializing_if = "category_is_absent"
    )]
    pub category: C,
    /// The date of the first occurrence.
    pub start_date: Date,
    /// How often the rule repeats.
    pub interval: Interval,
    /// Inactive rules are kept but do not contribute to totals or previews.
    pub is_active: bool,
    /// When the rule was created.
    #[serde(with = "rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the rule was last changed.
    #[serde(with = "rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A recurring expense, e.g. rent or a streaming subscription.
pub type RecurringExpense = RecurrenceRule<HasCategory>;

/// A recurring income, e.g. a salary.
pub type RecurringIncome = RecurrenceRule<NoCategory>;

/// A concrete, computed occurrence of a [RecurrenceRule].
///
/// Occurrences are never stored; they are recomputed from the current state of
/// the rule whenever they are needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// A synthetic ID of the form `"<rule id>-<position>"`.
    pub id: String,
    /// The ID of the rule this occurrence was projected from.
    pub rule_id: RecurrenceRuleId,
    /// The index of this occurrence in the projected sequence.
    pub position: usize,
    /// The day the occurrence happens on.
    pub date: Date,
    /// The amount of the rule.
    pub amount: Amount,
    /// The description of the rule, marked as recurring.
    pub description: String,
    /// The category of the rule, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// The interval of the rule.
    pub interval: Interval,
    /// Always `true`, lets clients tell occurrences apart from stored
    /// transactions.
    pub generated: bool,
}

impl Occurrence {
    /// Create the occurrence at `position` of `rule` on `date`.
    pub fn new<C: CategoryPolicy>(rule: &RecurrenceRule<C>, position: usize, date: Date) -> Self {
        Self {
            id: format!("{}-{}", rule.id, position),
            rule_id: rule.id,
            position,
            date,
            amount: rule.amount,
            description: format!("{} (Recurring)", rule.description),
            category: rule.category.as_category().map(str::to_owned),
            interval: rule.interval,
            generated: true,
        }
    }
}
