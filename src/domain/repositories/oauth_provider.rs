use crate::domain::errors::GatewayResult;
use async_trait::async_trait;
use zeroize::Zeroizing;

/// Which registered redirect URI the consent screen returns to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Backend,
    Frontend,
}

impl RedirectTarget {
    /// `?redirect=frontend` selects the frontend callback, anything else the backend
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some(value) if value.trim().eq_ignore_ascii_case("frontend") => RedirectTarget::Frontend,
            _ => RedirectTarget::Backend,
        }
    }
}

/// Result of a successful authorization code exchange
#[derive(Debug, Clone)]
pub struct AuthorizedAccount {
    /// Email reported by the userinfo endpoint, if any
    pub email: Option<String>,
    /// Only issued on first consent or when `prompt=consent` is honoured
    pub refresh_token: Option<Zeroizing<String>>,
}

/// OAuth2 web flow of the identity provider
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// URL of the consent screen for the given redirect target
    fn authorization_url(&self, target: RedirectTarget) -> GatewayResult<String>;

    /// Exchange an authorization code and look up the user's email
    async fn exchange_code(
        &self,
        code: &str,
        target: RedirectTarget,
    ) -> GatewayResult<AuthorizedAccount>;
}
