//! The endpoint for registering a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, ValidatedPassword, create_user, parse_email},
    db::lock_connection,
};

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The bcrypt cost for hashing the new password.
    pub password_hash_cost: u32,
    /// The database connection for managing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            password_hash_cost: state.password_hash_cost,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details a client sends to register.
///
/// Fields are optional so that a missing field is reported as a bad request
/// with a useful message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The email to log in with.
    pub email: Option<String>,
    /// The name to greet the user with.
    pub name: Option<String>,
    /// The plain text password.
    pub password: Option<String>,
}

/// The response to a successful registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// The ID of the new user.
    pub id: i64,
    /// A message for the client to display.
    pub message: String,
}

/// A route handler for registering a new user.
///
/// Responds with 201 Created and the new user's ID.
///
/// # Errors
///
/// Responds with:
/// - 400 Bad Request if a field is missing, the email is invalid, the name is
///   empty or the password is too weak,
/// - 409 Conflict if the email is already registered.
pub async fn register_user_endpoint(
    State(state): State<RegistrationState>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<RegisterResponse>), Error> {
    let raw_email = form.email.ok_or(Error::MissingField("email"))?;
    let name = form.name.ok_or(Error::MissingField("name"))?;
    let raw_password = form.password.ok_or(Error::MissingField("password"))?;

    let email = parse_email(&raw_email)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }

    let email_text = email.to_string();
    let password = ValidatedPassword::new(&raw_password, &[&email_text, name])?;
    let password_hash = PasswordHash::new(password, state.password_hash_cost)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(email, name, password_hash, &connection)?;

    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id.as_i64(),
            message: "User registered successfully".to_owned(),
        }),
    ))
}
