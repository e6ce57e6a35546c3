use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::CategoryPolicy,
    transaction::{
        OneTimeTransaction, TransactionForm, TransactionId, TransactionState, update_transaction,
    },
};

/// A route handler for replacing the fields of an expense or income.
///
/// Responds with the updated transaction.
///
/// # Errors
///
/// Responds with:
/// - 400 Bad Request if a field is missing or invalid,
/// - 404 Not Found if the transaction does not exist or belongs to another user.
pub async fn edit_transaction_endpoint<C: CategoryPolicy>(
    State(state): State<TransactionState>,
    user: AuthUser,
    Path(transaction_id): Path<TransactionId>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<OneTimeTransaction<C>>, Error> {
    let update = form.validate::<C>()?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction(transaction_id, user.id, update, &connection)?;

    Ok(Json(transaction))
}
