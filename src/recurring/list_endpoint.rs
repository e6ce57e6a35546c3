use axum::{Json, extract::State};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::{CategoryPolicy, RecurrenceRule},
    recurring::{RecurringState, get_recurrence_rules},
};

/// A route handler for listing the caller's recurring expenses or incomes,
/// most recently created first. Inactive rules are included.
pub async fn list_recurring_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
) -> Result<Json<Vec<RecurrenceRule<C>>>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let rules = get_recurrence_rules(user.id, &connection)?;

    Ok(Json(rules))
}
