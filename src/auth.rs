use crate::secrets::{validate_secret_strength, SecretError, MIN_API_KEY_LENGTH};
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use zeroize::Zeroizing;

/// Bearer keys accepted by the report endpoints
#[derive(Clone)]
pub struct ApiKeys(Arc<Vec<Zeroizing<String>>>);

impl ApiKeys {
    /// Validate the configured keys.
    ///
    /// At least one key is required and every key must pass
    /// `validate_secret_strength`, so the service never starts unauthenticated.
    pub fn new(keys: Vec<Zeroizing<String>>) -> Result<Self, SecretError> {
        if keys.is_empty() {
            return Err(SecretError::ValidationFailed(format!(
                "No API keys configured. Set API_KEYS to a comma-separated list of keys \
                 of at least {} characters (e.g. openssl rand -base64 32)",
                MIN_API_KEY_LENGTH
            )));
        }

        for key in &keys {
            if let Err(e) = validate_secret_strength(key, MIN_API_KEY_LENGTH) {
                tracing::error!("SECURITY ERROR: rejected API key: {}", e);
                return Err(e);
            }
        }

        tracing::info!(
            "✓ API authentication initialized with {} valid key(s)",
            keys.len()
        );
        Ok(Self(Arc::new(keys)))
    }

    /// Check if an API key is valid
    pub fn contains(&self, candidate: &str) -> bool {
        self.0
            .iter()
            .any(|key| constant_time_eq(key.as_bytes(), candidate.as_bytes()))
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Middleware to require authentication for protected endpoints
pub async fn require_auth(
    State(keys): State<ApiKeys>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    match auth_header {
        Some(auth) => match auth.strip_prefix("Bearer ") {
            Some(key) if keys.contains(key) => Ok(next.run(request).await),
            Some(_) => {
                tracing::warn!("Invalid API key attempted");
                Err(StatusCode::UNAUTHORIZED)
            }
            None => {
                tracing::warn!("Invalid Authorization header format (expected Bearer token)");
                Err(StatusCode::UNAUTHORIZED)
            }
        },
        None => {
            tracing::warn!("Missing Authorization header");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
