use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::CategoryPolicy,
    transaction::{TransactionId, TransactionState, delete_transaction},
};

/// A route handler for deleting an expense or income.
///
/// # Errors
///
/// Responds with 404 Not Found if the transaction does not exist or belongs to
/// another user.
pub async fn delete_transaction_endpoint<C: CategoryPolicy>(
    State(state): State<TransactionState>,
    user: AuthUser,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Json<Value>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    delete_transaction::<C>(transaction_id, user.id, &connection)?;

    tracing::debug!(
        "User {} deleted {} {transaction_id}",
        user.id,
        C::KIND.as_str()
    );

    Ok(Json(json!({ "message": "Transaction deleted successfully" })))
}
