//! Resolves the bearer token of a request into the user making it.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde_json::json;

use crate::auth::{JwtKeys, UserID, decode_token};

/// The user making an authenticated request.
///
/// Add this as an argument to a handler to require a valid
/// `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    /// The ID of the user the token was issued to.
    pub id: UserID,
}

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The request did not have a bearer token.
    MissingToken,
    /// The bearer token was malformed, forged or expired.
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::InvalidToken => (StatusCode::FORBIDDEN, "Invalid or expired token"),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    JwtKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::MissingToken)?;

        let keys = JwtKeys::from_ref(state);

        decode_token(bearer.token(), &keys)
            .map(|claims| AuthUser { id: claims.sub })
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, extract::FromRef, http::StatusCode, routing::get};
    use axum_test::TestServer;
    use time::Duration;

    use crate::auth::{AuthUser, JwtKeys, UserID, create_token};

    #[derive(Clone)]
    struct TestState {
        keys: JwtKeys,
    }

    impl FromRef<TestState> for JwtKeys {
        fn from_ref(state: &TestState) -> Self {
            state.keys.clone()
        }
    }

    async fn handler_with_auth(user: AuthUser) -> Json<i64> {
        Json(user.id.as_i64())
    }

    fn get_test_server() -> (TestServer, JwtKeys) {
        let keys = JwtKeys::from_secret("foobar");
        let app = Router::new()
            .route("/protected", get(handler_with_auth))
            .with_state(TestState { keys: keys.clone() });

        (
            TestServer::new(app).expect("Could not create test server."),
            keys,
        )
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let (server, keys) = get_test_server();
        let token = create_token(UserID::new(5), "foo@bar.baz", Duration::hours(1), &keys).unwrap();

        let response = server.get("/protected").authorization_bearer(token).await;

        response.assert_status_ok();
        assert_eq!(response.json::<i64>(), 5);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let (server, _) = get_test_server();

        server
            .get("/protected")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_forbidden() {
        let (server, _) = get_test_server();

        server
            .get("/protected")
            .authorization_bearer("definitely.not.valid")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn expired_token_is_forbidden() {
        let (server, keys) = get_test_server();
        let token =
            create_token(UserID::new(5), "foo@bar.baz", Duration::hours(-2), &keys).unwrap();

        server
            .get("/protected")
            .authorization_bearer(token)
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }
}
