//! Fixtures shared by the unit tests.

use rusqlite::Connection;
use time::macros::date;

use crate::{
    AppState, UserID,
    amount::Amount,
    auth::{DEFAULT_TOKEN_DURATION, PasswordHash, create_token, create_user, parse_email},
    db::initialize,
    recurrence::{CategoryPolicy, Interval, RecurrenceRule},
    recurring::{NewRecurrenceRule, create_recurrence_rule},
};

/// The bcrypt hash of the password "okon".
pub(crate) const TEST_PASSWORD_HASH: &str =
    "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm";

/// The email of the user created by [get_test_app_state_with_user].
pub(crate) const TEST_EMAIL: &str = "test@example.com";

/// An app state backed by an empty in-memory database.
///
/// Uses the minimum bcrypt cost so that tests which register users stay fast.
#[track_caller]
pub(crate) fn get_test_app_state() -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory database.");
    let mut state =
        AppState::new(connection, "foobar", "Etc/UTC").expect("Could not create app state.");
    state.password_hash_cost = 4;

    state
}

/// An app state with one registered user, that user's ID and a bearer token for
/// them.
#[track_caller]
pub(crate) fn get_test_app_state_with_user() -> (AppState, UserID, String) {
    let state = get_test_app_state();
    let user_id = insert_test_user(
        &state
            .db_connection
            .lock()
            .expect("Could not lock database connection."),
        TEST_EMAIL,
    );
    let token = create_token(user_id, TEST_EMAIL, DEFAULT_TOKEN_DURATION, &state.jwt_keys)
        .expect("Could not create token.");

    (state, user_id, token)
}

/// An initialised in-memory database with one registered user.
#[track_caller]
pub(crate) fn get_test_connection_with_user() -> (Connection, UserID) {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory database.");
    initialize(&connection).expect("Could not initialize database.");
    let user_id = insert_test_user(&connection, TEST_EMAIL);

    (connection, user_id)
}

/// Register a user with the password "okon".
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> UserID {
    create_user(
        parse_email(email).expect("Invalid test email."),
        "Test User",
        PasswordHash::new_unchecked(TEST_PASSWORD_HASH),
        connection,
    )
    .expect("Could not create test user.")
    .id
}

/// Store a 9.99 "Subscription" in the "Bills" category that started on
/// 2024-01-01.
#[track_caller]
pub(crate) fn insert_test_rule<C: CategoryPolicy>(
    connection: &Connection,
    user_id: UserID,
    interval: Interval,
    is_active: bool,
) -> RecurrenceRule<C> {
    let new_rule = NewRecurrenceRule {
        description: "Subscription".to_owned(),
        amount: Amount::new_unchecked(9.99),
        category: C::from_input(Some("Bills".to_owned())).expect("Invalid test category."),
        start_date: date!(2024 - 01 - 01),
        interval,
        is_active,
    };

    create_recurrence_rule(user_id, new_rule, connection).expect("Could not create test rule.")
}
