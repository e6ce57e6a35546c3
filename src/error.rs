//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::recurrence::ProjectionError;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password do not match a registered user.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// The email is already used by another user.
    #[error("A user with this email already exists.")]
    DuplicateEmail,

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address.")]
    InvalidEmail(String),

    /// The user's display name was empty.
    #[error("Name cannot be empty.")]
    EmptyName,

    /// The user provided a password that is too easy to guess.
    #[error("Password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// A JSON web token could not be created.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The interval of a recurring transaction is not one of the known literals.
    #[error("Invalid interval. Must be Weekly, Monthly, or Annually.")]
    InvalidInterval(String),

    /// An amount was negative, infinite or not a number.
    #[error("Amount must be a non-negative number, got {0}.")]
    InvalidAmount(String),

    /// A description was empty or only whitespace.
    #[error("Description cannot be empty.")]
    EmptyDescription,

    /// An expense category was empty or only whitespace.
    #[error("Category cannot be empty.")]
    EmptyCategory,

    /// A required field was missing from the request body.
    #[error("The field \"{0}\" is required.")]
    MissingField(&'static str),

    /// A date that is not in the `YYYY-MM-DD` format or does not exist.
    #[error("\"{0}\" is not a valid date, expected YYYY-MM-DD.")]
    InvalidDate(String),

    /// A month index outside of 0 (January) to 11 (December).
    #[error("Month must be between 0 and 11, got {0}.")]
    InvalidMonth(i64),

    /// The query parameters could not be used, e.g. `month` without `year`.
    #[error("{0}")]
    InvalidQuery(String),

    /// The requested resource was not found.
    ///
    /// This is also used for resources that belong to another user so that
    /// clients cannot probe for the IDs of other users' data.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("The requested resource could not be found.")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// A recurrence rule could not be projected onto dates.
    #[error("could not project recurring transaction: {0}")]
    Projection(#[from] ProjectionError),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The HTTP status code that a client should see for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::DuplicateEmail => StatusCode::CONFLICT,
            Error::InvalidEmail(_)
            | Error::EmptyName
            | Error::TooWeak(_)
            | Error::InvalidInterval(_)
            | Error::InvalidAmount(_)
            | Error::EmptyDescription
            | Error::EmptyCategory
            | Error::MissingField(_)
            | Error::InvalidDate(_)
            | Error::InvalidMonth(_)
            | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::TokenCreation(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::Projection(_)
            | Error::InvalidTimezone(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = match self {
            Error::InvalidTimezone(timezone) => {
                tracing::error!("Could not get local timezone \"{timezone}\"");
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                )
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error if status_code.is_server_error() => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status_code, Json(json!({ "error": message }))).into_response()
    }
}
