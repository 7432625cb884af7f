//! Custom error types for the authentication service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::{error::DatabaseError, token::TokenError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing/invalid bearer token or an unknown/expired login state
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// The identity provider rejected or failed the handshake
    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Internal server error")]
    InternalServerError,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingCredential | TokenError::Invalid(_) => AuthError::Unauthorized,
            other => {
                error!("Token service error: {}", other);
                AuthError::InternalServerError
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AuthError::Provider(msg) => {
                error!("Identity provider error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Authentication with the identity provider failed".to_string(),
                )
            }
            AuthError::Database(DatabaseError::NotFound) => {
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }
            AuthError::Database(err) => {
                error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AuthError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
