use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::{CategoryPolicy, RecurrenceRuleId},
    recurring::{RecurringState, delete_recurrence_rule},
};

/// A route handler for deleting a recurring expense or income.
///
/// # Errors
///
/// Responds with 404 Not Found if the rule does not exist or belongs to
/// another user.
pub async fn delete_recurring_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
    Path(rule_id): Path<RecurrenceRuleId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_recurrence_rule::<C>(rule_id, user.id, &connection)?;

    tracing::debug!(
        "User {} deleted recurring {} {rule_id}",
        user.id,
        C::KIND.as_str()
    );

    Ok(Json(
        json!({ "message": "Recurring transaction deleted successfully" }),
    ))
}
