//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::json;

use crate::{
    AppState,
    auth::{get_current_user_endpoint, log_in_endpoint, register_user_endpoint},
    endpoints,
    logging::logging_middleware,
    recurrence::{HasCategory, NoCategory},
    recurring::{
        create_recurring_endpoint, delete_recurring_endpoint, edit_recurring_endpoint,
        list_recurring_endpoint, next_occurrences_endpoint, preview_endpoint,
        toggle_recurring_endpoint,
    },
    summary::get_summary_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        list_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Routes other than health, registration and log in need a bearer token,
/// which each handler checks with the [crate::auth::AuthUser] extractor.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::REGISTER, post(register_user_endpoint))
        .route(endpoints::LOG_IN, post(log_in_endpoint));

    let transaction_routes = Router::new()
        .route(
            endpoints::EXPENSES,
            post(create_transaction_endpoint::<HasCategory>)
                .get(list_transactions_endpoint::<HasCategory>),
        )
        .route(
            endpoints::EXPENSE,
            put(edit_transaction_endpoint::<HasCategory>)
                .delete(delete_transaction_endpoint::<HasCategory>),
        )
        .route(
            endpoints::INCOMES,
            post(create_transaction_endpoint::<NoCategory>)
                .get(list_transactions_endpoint::<NoCategory>),
        )
        .route(
            endpoints::INCOME,
            put(edit_transaction_endpoint::<NoCategory>)
                .delete(delete_transaction_endpoint::<NoCategory>),
        );

    let recurring_routes = Router::new()
        .route(
            endpoints::RECURRING_EXPENSES,
            post(create_recurring_endpoint::<HasCategory>)
                .get(list_recurring_endpoint::<HasCategory>),
        )
        .route(
            endpoints::RECURRING_EXPENSE,
            put(edit_recurring_endpoint::<HasCategory>)
                .patch(toggle_recurring_endpoint::<HasCategory>)
                .delete(delete_recurring_endpoint::<HasCategory>),
        )
        .route(
            endpoints::RECURRING_EXPENSE_NEXT,
            get(next_occurrences_endpoint::<HasCategory>),
        )
        .route(
            endpoints::RECURRING_EXPENSES_PREVIEW,
            get(preview_endpoint::<HasCategory>),
        )
        .route(
            endpoints::RECURRING_INCOMES,
            post(create_recurring_endpoint::<NoCategory>)
                .get(list_recurring_endpoint::<NoCategory>),
        )
        .route(
            endpoints::RECURRING_INCOME,
            put(edit_recurring_endpoint::<NoCategory>)
                .patch(toggle_recurring_endpoint::<NoCategory>)
                .delete(delete_recurring_endpoint::<NoCategory>),
        )
        .route(
            endpoints::RECURRING_INCOME_NEXT,
            get(next_occurrences_endpoint::<NoCategory>),
        )
        .route(
            endpoints::RECURRING_INCOMES_PREVIEW,
            get(preview_endpoint::<NoCategory>),
        );

    let protected_routes = Router::new()
        .route(endpoints::USER, get(get_current_user_endpoint))
        .route(endpoints::SUMMARY, get(get_summary_endpoint))
        .merge(transaction_routes)
        .merge(recurring_routes);

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Route not found" })),
    )
        .into_response()
}
