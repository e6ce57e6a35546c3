use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::CategoryPolicy,
    transaction::{OneTimeTransaction, TransactionState, get_transactions},
    validation::{MonthQuery, month_bounds},
};

/// A route handler for listing the caller's expenses or incomes, newest first.
///
/// If the query string has `month` (zero-based) and `year`, only transactions
/// dated in that month are listed.
///
/// # Errors
///
/// Responds with 400 Bad Request if only one of `month` and `year` is given or
/// the month is out of range.
pub async fn list_transactions_endpoint<C: CategoryPolicy>(
    State(state): State<TransactionState>,
    user: AuthUser,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<OneTimeTransaction<C>>>, Error> {
    let date_range = match query.selected_month()? {
        Some((month, year)) => Some(month_bounds(month, year)?),
        None => None,
    };

    let connection = lock_connection(&state.db_connection)?;
    let transactions = get_transactions(user.id, date_range, &connection)?;

    Ok(Json(transactions))
}
