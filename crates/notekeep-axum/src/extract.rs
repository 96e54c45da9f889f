// Bearer-token extractor for protected routes.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use notekeep::crypto::jwt::{verify_token, TokenIdentity};
use notekeep::AppContext;
use notekeep_core::error::{ApiError, ErrorCode};

use crate::ErrorResponse;

/// The verified bearer identity. Extracting this on a route makes the route
/// protected: no token is a 401, a bad or expired token is a 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TokenIdentity);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppContext>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ctx = Arc::<AppContext>::from_ref(state);

        let Some(token) = bearer_token(parts) else {
            return Err(ApiError::unauthorized(ErrorCode::NoToken).into());
        };

        match verify_token(token, &ctx.config.jwt_secret) {
            Some(identity) => Ok(AuthUser(identity)),
            None => Err(ApiError::unauthorized(ErrorCode::InvalidToken).into()),
        }
    }
}
