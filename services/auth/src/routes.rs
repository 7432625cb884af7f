//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware,
    response::{IntoResponse, Redirect},
    routing::get,
};
use chrono::Utc;
use common::Principal;
use oauth2::PkceCodeVerifier;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    identity::resolve_identity,
    middleware::auth_middleware,
    models::ProfileResponse,
    oauth::{GOOGLE_SCOPES, OAuthSession},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/auth/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/google", get(google_login))
        .route("/auth/google/callback", get(google_callback))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Start a Google login: remember the PKCE verifier under the CSRF state and redirect
pub async fn google_login(State(state): State<AppState>) -> AuthResult<Redirect> {
    let (auth_url, csrf_token, pkce_verifier) = state.oauth_client.generate_auth_url(&GOOGLE_SCOPES);

    let session = OAuthSession {
        pkce_verifier: pkce_verifier.secret().clone(),
        created_at: Utc::now().timestamp(),
    };

    state
        .redis_pool
        .set_json(
            &OAuthSession::key(csrf_token.secret()),
            &session,
            state.settings.oauth_state_ttl,
        )
        .await
        .map_err(|e| {
            error!("Failed to store OAuth state: {}", e);
            AuthError::InternalServerError
        })?;

    Ok(Redirect::to(&auth_url))
}

/// Query parameters sent back by the provider
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Finish a Google login and hand the issued token to the frontend
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> AuthResult<Redirect> {
    if let Some(provider_error) = query.error {
        return Err(AuthError::Provider(provider_error));
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        return Err(AuthError::Unauthorized);
    };

    let session: OAuthSession = state
        .redis_pool
        .take_json(&OAuthSession::key(&csrf_state))
        .await
        .map_err(|e| {
            error!("Failed to load OAuth state: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| {
            warn!("Unknown or expired OAuth state");
            AuthError::Unauthorized
        })?;

    let access_token = state
        .oauth_client
        .exchange_code(code, PkceCodeVerifier::new(session.pkce_verifier))
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))?;

    let identity = state
        .oauth_client
        .fetch_identity(&access_token)
        .await
        .map_err(|e| AuthError::Provider(e.to_string()))?;

    let user = resolve_identity(state.user_repository.as_ref(), &identity)
        .await?
        .into_user();
    let token = state.jwt_service.issue(&user.principal())?;
    info!("Login completed for user {}", user.id);

    Ok(Redirect::to(&state.settings.frontend_callback(&token)))
}

/// Profile of the authenticated caller
pub async fn profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> AuthResult<Json<ProfileResponse>> {
    let user = state
        .user_repository
        .find_by_id(principal.id)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}
