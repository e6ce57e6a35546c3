//! The endpoint for exchanging an email and password for a bearer token.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{JwtKeys, create_token, get_user_by_email, parse_email},
    db::lock_connection,
};

/// The state needed to log in a user.
#[derive(Debug, Clone)]
pub struct LoginState {
    /// The keys for signing tokens.
    pub jwt_keys: JwtKeys,
    /// How long issued tokens are valid for.
    pub token_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoginState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            jwt_keys: state.jwt_keys.clone(),
            token_duration: state.token_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The credentials a client sends to log in.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LogInData {
    /// The email the user registered with.
    pub email: Option<String>,
    /// The user's plain text password.
    pub password: Option<String>,
}

/// The response to a successful log in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogInResponse {
    /// The bearer token to send in the `Authorization` header.
    pub token: String,
    /// Always "Bearer".
    pub token_type: String,
    /// The number of seconds until the token expires.
    pub expires_in: i64,
    /// The user's display name.
    pub name: String,
}

/// A route handler for logging in a user.
///
/// # Errors
///
/// Responds with:
/// - 400 Bad Request if the email or password is missing,
/// - 401 Unauthorized if the email is not registered or the password is wrong.
pub async fn log_in_endpoint(
    State(state): State<LoginState>,
    Json(user_data): Json<LogInData>,
) -> Result<Json<LogInResponse>, Error> {
    let raw_email = user_data.email.ok_or(Error::MissingField("email"))?;
    let password = user_data.password.ok_or(Error::MissingField("password"))?;

    // Do not tell the client which of the email or password was wrong.
    let email = parse_email(&raw_email).map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    if !user.password_hash.verify(&password)? {
        return Err(Error::InvalidCredentials);
    }

    let token = create_token(
        user.id,
        &user.email.to_string(),
        state.token_duration,
        &state.jwt_keys,
    )?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(LogInResponse {
        token,
        token_type: "Bearer".to_owned(),
        expires_in: state.token_duration.whole_seconds(),
        name: user.name,
    }))
}
