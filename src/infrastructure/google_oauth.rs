//! Google OAuth2 client
//!
//! Consent URL construction, authorization code exchange, access token
//! refresh and the userinfo lookup, all over plain HTTPS with `reqwest`.

use crate::domain::errors::{GatewayError, GatewayResult};
use crate::domain::repositories::oauth_provider::{
    AuthorizedAccount, OAuthProvider, RedirectTarget,
};
use crate::domain::value_objects::credential::Credential;
use crate::infrastructure::{ensure_success, transport_error};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;
use zeroize::Zeroizing;

pub const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Scopes requested on the consent screen
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/adwords",
];

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3600;

#[derive(Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: Zeroizing<String>,
    pub backend_redirect_uri: String,
    pub frontend_redirect_uri: String,
    pub auth_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

impl GoogleOAuthConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: Zeroizing<String>,
        backend_redirect_uri: impl Into<String>,
        frontend_redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            backend_redirect_uri: backend_redirect_uri.into(),
            frontend_redirect_uri: frontend_redirect_uri.into(),
            auth_endpoint: AUTH_ENDPOINT.to_string(),
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: USERINFO_ENDPOINT.to_string(),
        }
    }

    fn redirect_uri(&self, target: RedirectTarget) -> GatewayResult<&str> {
        let uri = match target {
            RedirectTarget::Backend => &self.backend_redirect_uri,
            RedirectTarget::Frontend => &self.frontend_redirect_uri,
        };
        if uri.is_empty() {
            return Err(GatewayError::NotConfigured(format!(
                "No OAuth redirect URI configured for {:?} callback",
                target
            )));
        }
        Ok(uri)
    }

    fn require_client(&self) -> GatewayResult<()> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(GatewayError::NotConfigured(
                "GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Short-lived access token minted from a refresh token
pub struct AccessToken {
    pub token: Zeroizing<String>,
    pub expires_in_secs: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

pub struct GoogleOAuthClient {
    client: Client,
    config: GoogleOAuthConfig,
}

impl GoogleOAuthClient {
    pub fn new(client: Client, config: GoogleOAuthConfig) -> Self {
        Self { client, config }
    }

    /// Mint an access token from a stored refresh token
    pub async fn refresh_access_token(&self, credential: &Credential) -> GatewayResult<AccessToken> {
        self.config.require_client()?;

        let response = self
            .client
            .post(&self.config.token_endpoint)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", credential.expose()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            warn!("Token refresh rejected ({}): {}", status, body.trim());
            return Err(GatewayError::Authentication(
                "Refresh token expired or revoked".to_string(),
            ));
        }

        let tokens: TokenResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        let token = tokens.access_token.ok_or_else(|| {
            GatewayError::Parse("Access token not found in token response".to_string())
        })?;

        debug!("Refreshed Google access token");
        Ok(AccessToken {
            token: Zeroizing::new(token),
            expires_in_secs: tokens.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        })
    }

    async fn fetch_user_email(&self, access_token: &str) -> GatewayResult<Option<String>> {
        let response = self
            .client
            .get(&self.config.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let info: UserInfo = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        Ok(info.email.filter(|email| !email.trim().is_empty()))
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self, target: RedirectTarget) -> GatewayResult<String> {
        if self.config.client_id.is_empty() {
            return Err(GatewayError::NotConfigured(
                "GOOGLE_CLIENT_ID must be set".to_string(),
            ));
        }
        let redirect_uri = self.config.redirect_uri(target)?;
        info!("Google OAuth redirect_uri used: {}", redirect_uri);

        let scope = SCOPES.join(" ");
        let url = Url::parse_with_params(
            &self.config.auth_endpoint,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| GatewayError::NotConfigured(format!("Invalid auth endpoint: {}", e)))?;

        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        code: &str,
        target: RedirectTarget,
    ) -> GatewayResult<AuthorizedAccount> {
        self.config.require_client()?;
        let redirect_uri = self.config.redirect_uri(target)?;

        let response = self
            .client
            .post(&self.config.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let tokens: TokenResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport_error)?;
        let access_token = Zeroizing::new(tokens.access_token.ok_or_else(|| {
            GatewayError::Authentication(
                "Access token not found in Google's token response".to_string(),
            )
        })?);

        let email = self.fetch_user_email(&access_token).await?;
        Ok(AuthorizedAccount {
            email,
            refresh_token: tokens
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(Zeroizing::new),
        })
    }
}
