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
    recurring::{RecurringForm, RecurringState, create_recurrence_rule},
};

/// A route handler for creating a recurring expense or income.
///
/// Responds with 201 Created and the new rule.
///
/// # Errors
///
/// Responds with 400 Bad Request if a field is missing or invalid, including
/// an interval other than "Weekly", "Monthly" or "Annually".
pub async fn create_recurring_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
    Json(form): Json<RecurringForm>,
) -> Result<Response, Error> {
    let new_rule = form.validate_new::<C>()?;

    let connection = lock_connection(&state.db_connection)?;
    let rule = create_recurrence_rule(user.id, new_rule, &connection)?;

    tracing::debug!(
        "User {} created recurring {} {} ({})",
        user.id,
        C::KIND.as_str(),
        rule.id,
        rule.interval
    );

    Ok((StatusCode::CREATED, Json(rule)).into_response())
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        recurrence::{HasCategory, NoCategory},
        recurring::create_recurring_endpoint,
        test_utils::get_test_app_state_with_user,
    };

    fn get_test_server() -> (TestServer, String) {
        let (state, _, token) = get_test_app_state_with_user();
        let app = Router::new()
            .route(
                "/recurring-expenses",
                post(create_recurring_endpoint::<HasCategory>),
            )
            .route(
                "/recurring-incomes",
                post(create_recurring_endpoint::<NoCategory>),
            )
            .with_state(state);

        (
            TestServer::new(app).expect("Could not create test server."),
            token,
        )
    }

    #[tokio::test]
    async fn create_recurring_expense() {
        let (server, token) = get_test_server();

        let response = server
            .post("/recurring-expenses")
            .authorization_bearer(token)
            .json(&json!({
                "description": "Netflix",
                "amount": 15.99,
                "category": "Entertainment",
                "startDate": "2024-01-15",
                "interval": "Monthly",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["description"], "Netflix");
        assert_eq!(body["amount"], 15.99);
        assert_eq!(body["category"], "Entertainment");
        assert_eq!(body["startDate"], "2024-01-15");
        assert_eq!(body["interval"], "Monthly");
        assert_eq!(body["isActive"], true);
    }

    #[tokio::test]
    async fn create_recurring_income_without_category() {
        let (server, token) = get_test_server();

        let response = server
            .post("/recurring-incomes")
            .authorization_bearer(token)
            .json(&json!({
                "description": "Salary",
                "amount": 4000,
                "startDate": "2024-01-01",
                "interval": "Weekly",
                "isActive": false,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert!(body.get("category").is_none());
        assert_eq!(body["isActive"], false);
    }

    #[tokio::test]
    async fn create_with_unknown_interval_fails() {
        let (server, token) = get_test_server();

        let response = server
            .post("/recurring-incomes")
            .authorization_bearer(token)
            .json(&json!({
                "description": "Salary",
                "amount": 4000,
                "startDate": "2024-01-01",
                "interval": "Daily",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "Invalid interval. Must be Weekly, Monthly, or Annually."
        );
    }

    #[tokio::test]
    async fn create_with_empty_description_fails() {
        let (server, token) = get_test_server();

        server
            .post("/recurring-expenses")
            .authorization_bearer(token)
            .json(&json!({
                "description": "  ",
                "amount": 10,
                "category": "Bills",
                "startDate": "2024-01-01",
                "interval": "Annually",
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
