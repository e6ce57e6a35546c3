//! User accounts and bearer token authentication.

mod log_in;
mod middleware;
mod password;
mod register_user;
mod token;
mod user;

pub use log_in::log_in_endpoint;
pub use middleware::AuthUser;
pub use password::{PasswordHash, ValidatedPassword};
pub use register_user::register_user_endpoint;
pub use token::{DEFAULT_TOKEN_DURATION, JwtKeys, create_token, decode_token};
pub use user::{
    User, UserID, create_user, create_user_table, get_current_user_endpoint, get_user_by_email,
    get_user_by_id, parse_email, update_password,
};

#[cfg(test)]
pub(crate) use log_in::LogInResponse;
