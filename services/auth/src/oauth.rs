//! OAuth2 integration for the Google identity provider

use anyhow::Result;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{config::AuthSettings, models::ExternalIdentity};

/// Scopes requested at the provider
pub const GOOGLE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// OAuth2 client wrapper
#[derive(Clone)]
pub struct OAuthClient {
    client: BasicClient,
    userinfo_url: String,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Create a new OAuth2 client for Google
    pub fn new_google(settings: &AuthSettings) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(settings.google_client_id.clone()),
            Some(ClientSecret::new(settings.google_client_secret.clone())),
            AuthUrl::new(settings.google_auth_url.clone())?,
            Some(TokenUrl::new(settings.google_token_url.clone())?),
        )
        .set_redirect_uri(RedirectUrl::new(settings.google_redirect_url.clone())?);

        Ok(Self {
            client,
            userinfo_url: settings.google_userinfo_url.clone(),
            http: reqwest::Client::new(),
        })
    }

    /// Generate authorization URL with PKCE
    pub fn generate_auth_url(&self, scopes: &[&str]) -> (String, CsrfToken, PkceCodeVerifier) {
        info!("Generating Google authorization URL");

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = self
            .client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in scopes {
            request = request.add_scope(Scope::new(scope.to_string()));
        }

        let (auth_url, csrf_token) = request.url();

        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchange the authorization code for a provider access token
    pub async fn exchange_code(&self, code: String, pkce_verifier: PkceCodeVerifier) -> Result<String> {
        info!("Exchanging authorization code with Google");

        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        Ok(token_response.access_token().secret().clone())
    }

    /// Fetch the userinfo document and map it to an external identity
    pub async fn fetch_identity(&self, access_token: &str) -> Result<ExternalIdentity> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to get Google user profile: {}", response.status());
        }

        let google_user: GoogleUser = response.json().await?;
        Ok(google_user.into())
    }
}

/// Google userinfo response
#[derive(Debug, Deserialize)]
struct GoogleUser {
    id: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl From<GoogleUser> for ExternalIdentity {
    fn from(user: GoogleUser) -> Self {
        let name = user
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| user.email.clone());

        ExternalIdentity {
            external_auth_id: user.id,
            email: user.email,
            name,
            avatar_url: user.picture,
        }
    }
}

/// Pending login stored in Redis under [`OAuthSession::key`]
#[derive(Debug, Serialize, Deserialize)]
pub struct OAuthSession {
    pub pkce_verifier: String,
    pub created_at: i64,
}

impl OAuthSession {
    pub fn key(state: &str) -> String {
        format!("oauth_state:{}", state)
    }
}
