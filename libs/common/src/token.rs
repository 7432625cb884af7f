//! JWT service for access-token issuance and validation
//!
//! The auth service signs tokens after a successful external login; the api
//! service only verifies them. Keys are either a shared HS256 secret
//! (`JWT_SECRET`) or an RS256 key pair. A verify-only deployment may omit the
//! private key, in which case [`JwtService::issue`] fails with
//! [`TokenError::SigningUnavailable`].

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::principal::{Principal, Role};

/// Errors raised while resolving or issuing bearer credentials
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("missing bearer credential")]
    MissingCredential,

    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("token configuration error: {0}")]
    Configuration(String),

    #[error("this service holds no signing key")]
    SigningUnavailable,
}

/// Key material used to sign and verify tokens
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// Shared secret, HS256
    Secret(String),
    /// PEM encoded key pair, RS256
    Rsa {
        private_key: Option<String>,
        public_key: String,
    },
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub keys: KeyMaterial,
    /// Access token lifetime in seconds (default: 7 days)
    pub access_token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: shared HS256 secret; takes precedence over RSA keys
    /// - `JWT_PRIVATE_KEY`: RS256 private key (PEM or path to a PEM file), optional
    /// - `JWT_PUBLIC_KEY`: RS256 public key (PEM or path to a PEM file)
    /// - `JWT_ACCESS_TOKEN_EXPIRY`: access token lifetime in seconds (default: 604800)
    pub fn from_env() -> Result<Self, TokenError> {
        let access_token_expiry = std::env::var("JWT_ACCESS_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(604_800);

        if let Ok(secret) = std::env::var("JWT_SECRET") {
            if secret.is_empty() {
                return Err(TokenError::Configuration("JWT_SECRET is empty".to_string()));
            }
            return Ok(Self {
                keys: KeyMaterial::Secret(secret),
                access_token_expiry,
            });
        }

        let public_key = read_pem("JWT_PUBLIC_KEY")?.ok_or_else(|| {
            TokenError::Configuration(
                "either JWT_SECRET or JWT_PUBLIC_KEY must be set".to_string(),
            )
        })?;
        let private_key = read_pem("JWT_PRIVATE_KEY")?;

        Ok(Self {
            keys: KeyMaterial::Rsa {
                private_key,
                public_key,
            },
            access_token_expiry,
        })
    }
}

/// Read a PEM either inline from the variable or from the file it names
fn read_pem(var: &str) -> Result<Option<String>, TokenError> {
    let Ok(value) = std::env::var(var) else {
        return Ok(None);
    };

    if value.starts_with("-----BEGIN") {
        return Ok(Some(value));
    }

    std::fs::read_to_string(&value)
        .map(|pem| Some(pem.trim().to_string()))
        .map_err(|e| TokenError::Configuration(format!("failed to read {} ({}): {}", var, value, e)))
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Result<Self, TokenError> {
        let (algorithm, encoding_key, decoding_key) = match &config.keys {
            KeyMaterial::Secret(secret) => (
                Algorithm::HS256,
                Some(EncodingKey::from_secret(secret.as_bytes())),
                DecodingKey::from_secret(secret.as_bytes()),
            ),
            KeyMaterial::Rsa {
                private_key,
                public_key,
            } => {
                let encoding_key = private_key
                    .as_deref()
                    .map(|pem| EncodingKey::from_rsa_pem(pem.as_bytes()))
                    .transpose()
                    .map_err(|e| TokenError::Configuration(format!("bad private key: {}", e)))?;
                let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
                    .map_err(|e| TokenError::Configuration(format!("bad public key: {}", e)))?;
                (Algorithm::RS256, encoding_key, decoding_key)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
            access_token_expiry: config.access_token_expiry,
        })
    }

    /// Generate an access token for the given principal
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now().timestamp().max(0) as u64)
    }

    fn issue_at(&self, principal: &Principal, now: u64) -> Result<String, TokenError> {
        let encoding_key = self
            .encoding_key
            .as_ref()
            .ok_or(TokenError::SigningUnavailable)?;

        let claims = Claims {
            sub: principal.id,
            email: principal.email.clone(),
            role: principal.role,
            iat: now,
            exp: now + self.access_token_expiry,
        };

        Ok(encode(&Header::new(self.algorithm), &claims, encoding_key)?)
    }

    /// Validate a token and resolve the principal it was issued for
    pub fn verify(&self, token: &str) -> Result<Principal, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        debug!("Resolved principal {}", token_data.claims.sub);
        Ok(token_data.claims.into())
    }

    /// Get the access token expiry time
    pub fn access_token_expiry(&self) -> u64 {
        self.access_token_expiry
    }
}
