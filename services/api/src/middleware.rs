//! Principal resolution from bearer tokens

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Authentication middleware
///
/// Verifies the `Authorization: Bearer` token and inserts the resolved
/// [`common::Principal`] into the request extensions. Handlers take the
/// caller's identity from there and never from the request body.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Authorization(bearer) = req
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(ApiError::Unauthorized)?;

    let principal = state.jwt.verify(bearer.token()).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
