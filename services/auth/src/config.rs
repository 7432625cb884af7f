//! Service settings read from the environment

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Authentication service settings
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSettings {
    pub bind_address: String,
    /// Browser application that receives the issued token
    pub frontend_url: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_url: String,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub google_userinfo_url: String,
    /// Seconds a pending login (state + PKCE verifier) stays valid
    pub oauth_state_ttl: u64,
}

impl AuthSettings {
    /// # Environment Variables
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`: required
    /// - `BIND_ADDRESS` (default: 0.0.0.0:3000), `FRONTEND_URL`,
    ///   `GOOGLE_REDIRECT_URL`, `GOOGLE_AUTH_URL`, `GOOGLE_TOKEN_URL`,
    ///   `GOOGLE_USERINFO_URL`, `OAUTH_STATE_TTL` (default: 600)
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("frontend_url", "http://localhost:5173")?
            .set_default(
                "google_redirect_url",
                "http://localhost:3000/auth/google/callback",
            )?
            .set_default(
                "google_auth_url",
                "https://accounts.google.com/o/oauth2/v2/auth",
            )?
            .set_default("google_token_url", "https://oauth2.googleapis.com/token")?
            .set_default(
                "google_userinfo_url",
                "https://www.googleapis.com/oauth2/v2/userinfo",
            )?
            .set_default("oauth_state_ttl", 600)?
            .add_source(Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Where the browser lands after a successful login
    pub fn frontend_callback(&self, token: &str) -> String {
        format!(
            "{}/auth/callback?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        )
    }
}
