use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::CategoryPolicy,
    transaction::{TransactionForm, TransactionState, create_transaction},
};

/// A route handler for creating a new expense or income.
///
/// Responds with 201 Created and the new transaction.
///
/// # Errors
///
/// Responds with 400 Bad Request if a field is missing or invalid.
pub async fn create_transaction_endpoint<C: CategoryPolicy>(
    State(state): State<TransactionState>,
    user: AuthUser,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let new_transaction = form.validate::<C>()?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = create_transaction(user.id, new_transaction, &connection)?;

    tracing::debug!(
        "User {} created {} {}",
        user.id,
        C::KIND.as_str(),
        transaction.id
    );

    Ok((StatusCode::CREATED, Json(transaction)).into_response())
}
