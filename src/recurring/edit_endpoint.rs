use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    Error,
    auth::AuthUser,
    db::lock_connection,
    recurrence::{CategoryPolicy, RecurrenceRule, RecurrenceRuleId},
    recurring::{
        RecurringForm, RecurringState, ToggleForm, set_recurrence_rule_active,
        update_recurrence_rule,
    },
};

/// A route handler for changing some of the fields of a recurring expense or
/// income. Fields missing from the body are left unchanged.
///
/// # Errors
///
/// Responds with:
/// - 400 Bad Request if a field that is present is invalid,
/// - 404 Not Found if the rule does not exist or belongs to another user.
pub async fn edit_recurring_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
    Path(rule_id): Path<RecurrenceRuleId>,
    Json(form): Json<RecurringForm>,
) -> Result<Json<RecurrenceRule<C>>, Error> {
    let update = form.validate_update::<C>()?;

    let connection = lock_connection(&state.db_connection)?;
    let rule = update_recurrence_rule(rule_id, user.id, update, &connection)?;

    Ok(Json(rule))
}

/// A route handler for switching a recurring expense or income on or off.
///
/// # Errors
///
/// Responds with:
/// - 400 Bad Request if the body does not have `isActive`,
/// - 404 Not Found if the rule does not exist or belongs to another user.
pub async fn toggle_recurring_endpoint<C: CategoryPolicy>(
    State(state): State<RecurringState>,
    user: AuthUser,
    Path(rule_id): Path<RecurrenceRuleId>,
    Json(form): Json<ToggleForm>,
) -> Result<Json<RecurrenceRule<C>>, Error> {
    let is_active = form.is_active.ok_or(Error::MissingField("isActive"))?;

    let connection = lock_connection(&state.db_connection)?;
    let rule = set_recurrence_rule_active(rule_id, user.id, is_active, &connection)?;

    tracing::debug!(
        "User {} set recurring {} {rule_id} active: {is_active}",
        user.id,
        C::KIND.as_str()
    );

    Ok(Json(rule))
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::StatusCode, routing::put};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use crate::{
        recurrence::{HasCategory, Interval, NoCategory, RecurrenceRuleId},
        recurring::{edit_recurring_endpoint, toggle_recurring_endpoint},
        test_utils::{get_test_app_state_with_user, insert_test_rule},
    };

    fn get_test_server() -> (TestServer, String, RecurrenceRuleId) {
        let (state, user_id, token) = get_test_app_state_with_user();
        let rule = insert_test_rule::<HasCategory>(
            &state.db_connection.lock().unwrap(),
            user_id,
            Interval::Monthly,
            true,
        );

        let app = Router::new()
            .route(
                "/recurring-expenses/{id}",
                put(edit_recurring_endpoint::<HasCategory>)
                    .patch(toggle_recurring_endpoint::<HasCategory>),
            )
            .route(
                "/recurring-incomes/{id}",
                put(edit_recurring_endpoint::<NoCategory>)
                    .patch(toggle_recurring_endpoint::<NoCategory>),
            )
            .with_state(state);

        (
            TestServer::new(app).expect("Could not create test server."),
            token,
            rule.id,
        )
    }

    #[tokio::test]
    async fn partial_edit_keeps_other_fields() {
        let (server, token, id) = get_test_server();

        let response = server
            .put(&format!("/recurring-expenses/{id}"))
            .authorization_bearer(token)
            .json(&json!({ "amount": 17.49, "interval": "Annually" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["id"], id);
        assert_eq!(body["amount"], 17.49);
        assert_eq!(body["interval"], "Annually");
        assert_eq!(body["description"], "Subscription");
        assert_eq!(body["category"], "Bills");
        assert_eq!(body["isActive"], true);
    }

    #[tokio::test]
    async fn edit_with_unknown_interval_fails() {
        let (server, token, id) = get_test_server();

        server
            .put(&format!("/recurring-expenses/{id}"))
            .authorization_bearer(token)
            .json(&json!({ "interval": "Fortnightly" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn toggle_sets_active_flag() {
        let (server, token, id) = get_test_server();

        let response = server
            .patch(&format!("/recurring-expenses/{id}"))
            .authorization_bearer(&token)
            .json(&json!({ "isActive": false }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["isActive"], false);

        let response = server
            .patch(&format!("/recurring-expenses/{id}"))
            .authorization_bearer(&token)
            .json(&json!({ "isActive": true }))
            .await;

        assert_eq!(response.json::<Value>()["isActive"], true);
    }

    #[tokio::test]
    async fn toggle_requires_is_active() {
        let (server, token, id) = get_test_server();

        let response = server
            .patch(&format!("/recurring-expenses/{id}"))
            .authorization_bearer(token)
            .json(&json!({}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(
            response.json::<Value>()["error"],
            "The field \"isActive\" is required."
        );
    }

    #[tokio::test]
    async fn expense_rule_is_not_an_income_rule() {
        let (server, token, id) = get_test_server();

        server
            .patch(&format!("/recurring-incomes/{id}"))
            .authorization_bearer(token)
            .json(&json!({ "isActive": false }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
