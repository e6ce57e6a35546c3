//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The route for checking that the server is up.
pub const HEALTH: &str = "/api/health";
/// The route for registering a new user.
pub const REGISTER: &str = "/api/auth/register";
/// The route for exchanging an email and password for a bearer token.
pub const LOG_IN: &str = "/api/auth/login";
/// The route for the details of the logged in user.
pub const USER: &str = "/api/user";
/// The route to create and list one-time expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to edit or delete a one-time expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to create and list one-time incomes.
pub const INCOMES: &str = "/api/incomes";
/// The route to edit or delete a one-time income.
pub const INCOME: &str = "/api/incomes/{income_id}";
/// The route to create and list recurring expenses.
pub const RECURRING_EXPENSES: &str = "/api/recurring-expenses";
/// The route to edit, toggle or delete a recurring expense.
pub const RECURRING_EXPENSE: &str = "/api/recurring-expenses/{rule_id}";
/// The route for the next dates of a recurring expense.
pub const RECURRING_EXPENSE_NEXT: &str = "/api/recurring-expenses/{rule_id}/next";
/// The route for previewing all active recurring expenses.
pub const RECURRING_EXPENSES_PREVIEW: &str = "/api/recurring-expenses/preview";
/// The route to create and list recurring incomes.
pub const RECURRING_INCOMES: &str = "/api/recurring-incomes";
/// The route to edit, toggle or delete a recurring income.
pub const RECURRING_INCOME: &str = "/api/recurring-incomes/{rule_id}";
/// The route for the next dates of a recurring income.
pub const RECURRING_INCOME_NEXT: &str = "/api/recurring-incomes/{rule_id}/next";
/// The route for previewing all active recurring incomes.
pub const RECURRING_INCOMES_PREVIEW: &str = "/api/recurring-incomes/preview";
/// The route for the monthly summary.
pub const SUMMARY: &str = "/api/summary";

/// Fill the `{...}` parameter of `endpoint_path` with `id`, e.g.
/// `format_endpoint(RECURRING_EXPENSE, 7)` gives "/api/recurring-expenses/7".
///
/// Only the first parameter is filled. A path without one is returned as is.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((head, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };
    let tail = rest.split_once('}').map_or("", |(_, tail)| tail);

    format!("{head}{id}{tail}")
}
