use crate::domain::errors::{GatewayError, ReportError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Errors returned by the HTTP handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    BadGateway {
        message: String,
        details: Option<String>,
    },

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl ApiError {
    pub fn bad_gateway(message: impl Into<String>, cause: &GatewayError) -> Self {
        ApiError::BadGateway {
            message: message.into(),
            details: Some(cause.to_string()),
        }
    }

    pub fn internal(message: impl Into<String>, details: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(e: ReportError) -> Self {
        let message = e.to_string();
        match e {
            ReportError::Validation(_)
            | ReportError::MissingRootAccount
            | ReportError::MissingRefreshToken(_) => ApiError::BadRequest(message),
            ReportError::AccountNotFound(_) => ApiError::NotFound(message),
            ReportError::Tracker(cause) => {
                ApiError::bad_gateway("Failed to fetch the tracker report.", &cause)
            }
            ReportError::Storage(details) => {
                ApiError::internal("A database error occurred while loading the Google account.", details)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed with {}: {:?}", status, self);
        }

        let body = match self {
            ApiError::BadRequest(error) | ApiError::NotFound(error) => ErrorResponse {
                error,
                details: None,
            },
            ApiError::BadGateway { message, details } | ApiError::Internal { message, details } => {
                ErrorResponse {
                    error: message,
                    details,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ValidationError;

    #[test]
    fn test_report_error_status_mapping() {
        let cases = vec![
            (
                ReportError::Validation(ValidationError::MissingParameter("email".into())),
                StatusCode::BAD_REQUEST,
            ),
            (ReportError::AccountNotFound("a@b.c".into()), StatusCode::NOT_FOUND),
            (ReportError::MissingRefreshToken("a@b.c".into()), StatusCode::BAD_REQUEST),
            (
                ReportError::Tracker(GatewayError::Network("timeout".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (ReportError::Storage("locked".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }

    #[test]
    fn test_details_are_omitted_when_absent() {
        let body = ErrorResponse {
            error: "Missing".to_string(),
            details: None,
        };
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"error": "Missing"})
        );
    }
}
