pub mod binom_client;
pub mod google_ads_client;
pub mod google_oauth;

use crate::domain::errors::GatewayError;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

const USER_AGENT: &str = concat!("adrecon/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client with the configured request timeout
pub fn build_http_client(timeout: Duration) -> Result<Client, GatewayError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| GatewayError::NotConfigured(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure onto the gateway error taxonomy
pub(crate) fn transport_error(e: reqwest::Error) -> GatewayError {
    if e.is_decode() {
        GatewayError::Parse(e.to_string())
    } else {
        GatewayError::Network(e.to_string())
    }
}

/// Return the response if successful, otherwise the status and body as an error
pub(crate) async fn ensure_success(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

pub(crate) fn status_error(status: StatusCode, body: String) -> GatewayError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authentication(
            format!("{} {}", status.as_u16(), body.trim()).trim().to_string(),
        ),
        _ => GatewayError::Api {
            status: status.as_u16(),
            message: body,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "expired".to_string()),
            GatewayError::Authentication(_)
        ));
        assert_eq!(
            status_error(StatusCode::BAD_GATEWAY, "upstream".to_string()),
            GatewayError::Api {
                status: 502,
                message: "upstream".to_string()
            }
        );
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
    }
}
