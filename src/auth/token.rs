//! JSON web tokens that identify a logged in user.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};
use time::{Duration, OffsetDateTime};

use crate::{Error, auth::UserID};

/// How long a token is valid for after it is issued.
pub const DEFAULT_TOKEN_DURATION: Duration = Duration::hours(1);

/// The contents of a JSON web token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: UserID,
    /// The email of the user the token was issued to.
    pub email: String,
    /// The expiry time of the token as a Unix timestamp.
    pub exp: i64,
    /// The time the token was issued as a Unix timestamp.
    pub iat: i64,
}

/// The keys for signing and verifying tokens.
#[derive(Clone)]
pub struct JwtKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtKeys {
    /// Derive the HMAC keys from `secret`.
    pub fn from_secret(secret: &str) -> Self {
        let hash = Sha512::digest(secret);

        Self {
            encoding_key: EncodingKey::from_secret(&hash),
            decoding_key: DecodingKey::from_secret(&hash),
        }
    }
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

/// Create a signed token for `user_id` that expires `duration` from now.
///
/// # Errors
///
/// Returns [Error::TokenCreation] if the token could not be signed.
pub fn create_token(
    user_id: UserID,
    email: &str,
    duration: Duration,
    keys: &JwtKeys,
) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user_id,
        email: email.to_owned(),
        exp: (now + duration).unix_timestamp(),
        iat: now.unix_timestamp(),
    };

    encode(&Header::default(), &claims, &keys.encoding_key)
        .map_err(|error| Error::TokenCreation(error.to_string()))
}

/// Verify `token` and get its claims.
///
/// Returns `None` if the token is malformed, has an invalid signature, or has
/// expired.
pub fn decode_token(token: &str, keys: &JwtKeys) -> Option<Claims> {
    decode::<Claims>(token, &keys.decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .inspect_err(|error| tracing::debug!("Rejected token: {error}"))
        .ok()
}
