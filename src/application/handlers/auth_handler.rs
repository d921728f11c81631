use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::application::handlers::api_error::ApiError;
use crate::application::state::AppState;
use crate::domain::errors::GatewayError;
use crate::domain::repositories::credential_store::UpsertOutcome;
use crate::domain::repositories::oauth_provider::RedirectTarget;

/// Query parameters for the consent URL endpoint
#[derive(Debug, Deserialize)]
pub struct AuthUrlQuery {
    /// "frontend" selects the frontend callback
    pub redirect: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

/// Query parameters Google appends to the callback
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub redirect: Option<String>,
}

/// Build the Google consent URL
pub async fn google_auth_url(
    State(state): State<AppState>,
    Query(params): Query<AuthUrlQuery>,
) -> Result<Json<AuthUrlResponse>, ApiError> {
    let target = RedirectTarget::from_param(params.redirect.as_deref());
    let auth_url = state
        .oauth
        .authorization_url(target)
        .map_err(|e| ApiError::internal("Google OAuth is not configured.", e.to_string()))?;

    Ok(Json(AuthUrlResponse { auth_url }))
}

/// OAuth callback: store the refresh token and send the browser back to the frontend
pub async fn google_auth_callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackQuery>,
) -> Result<Redirect, ApiError> {
    let code = params
        .code
        .filter(|code| !code.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Authorization code not found in callback.".to_string()))?;
    let target = RedirectTarget::from_param(params.redirect.as_deref());

    let authorized = state
        .oauth
        .exchange_code(&code, target)
        .await
        .map_err(|e| match e {
            GatewayError::NotConfigured(_) => {
                ApiError::internal("Google OAuth is not configured.", e.to_string())
            }
            other => {
                error!("Token exchange error: {}", other);
                ApiError::bad_gateway("Failed to exchange code for tokens with Google.", &other)
            }
        })?;

    let email = authorized.email.ok_or_else(|| {
        ApiError::BadRequest(
            "Could not retrieve user email from Google's token response.".to_string(),
        )
    })?;

    let outcome = state
        .credentials
        .upsert(&email, authorized.refresh_token.as_deref().map(|t| t.as_str()))
        .await
        .map_err(|e| {
            error!("Database error while processing Google account for {}: {}", email, e);
            ApiError::internal(
                "A database error occurred while processing the Google account.",
                e.to_string(),
            )
        })?;

    match outcome {
        UpsertOutcome::Created => info!("Google account authorized and created: {}", email),
        UpsertOutcome::Updated | UpsertOutcome::Unchanged => {
            info!("Google account re-authorized: {}", email)
        }
        UpsertOutcome::Skipped => info!("No refresh token issued for new account {}", email),
    }

    Ok(Redirect::to(&frontend_callback_url(&state.frontend_url, &email)))
}

fn frontend_callback_url(frontend_url: &str, email: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
    format!(
        "{}/auth/google/callback?email={}",
        frontend_url.trim_end_matches('/'),
        encoded
    )
}
