//! Middleware for JWT token validation and authentication

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use common::token::TokenError;
use tracing::debug;

use crate::{AppState, error::AuthError};

/// Verify the bearer token and add the caller's principal to the request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Authorization(bearer) = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(TokenError::MissingCredential)?;

    let principal = state.jwt_service.verify(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AuthError::from(e)
    })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
