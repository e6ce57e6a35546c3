//! Storage and route handlers for recurring expenses and incomes.
//!
//! The dates a rule falls on are computed by [crate::recurrence]; this module
//! only stores the rules and exposes them over HTTP.

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod projection_endpoint;

pub use core::{
    RecurringForm, RecurringState, ToggleForm, create_recurrence_rule,
    create_recurring_transaction_table, delete_recurrence_rule, get_recurrence_rule,
    get_recurrence_rules, set_recurrence_rule_active, update_recurrence_rule,
};
pub use create_endpoint::create_recurring_endpoint;
pub use delete_endpoint::delete_recurring_endpoint;
pub use edit_endpoint::{edit_recurring_endpoint, toggle_recurring_endpoint};
pub use list_endpoint::list_recurring_endpoint;
pub use projection_endpoint::{next_occurrences_endpoint, preview_endpoint};

#[cfg(test)]
pub(crate) use core::{NewRecurrenceRule, RecurrenceRuleUpdate};
