use thiserror::Error;

/// Errors raised while validating caller input before any external call is made
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date {start} is after end date {end}")]
    InvertedDateRange { start: String, end: String },

    #[error("Credential must not be empty")]
    EmptyCredential,

    #[error("Invalid customer id: {0}")]
    InvalidCustomerId(String),
}

/// Errors returned by the vendor gateways (Google Ads, tracker, OAuth)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The account exists but has nothing to report, e.g. metrics requested on a manager
    #[error("No data: {0}")]
    NoData(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Common result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the report service to the HTTP layer
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Google account not found for email: {0}")]
    AccountNotFound(String),

    #[error("No refresh token found for {0}. Please re-authenticate.")]
    MissingRefreshToken(String),

    #[error("No root manager account configured")]
    MissingRootAccount,

    #[error("Tracker request failed: {0}")]
    Tracker(GatewayError),

    #[error("Credential storage failed: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let error = ValidationError::InvalidDate("2024-13-01".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid date '2024-13-01': expected YYYY-MM-DD"
        );
    }

    #[test]
    fn test_gateway_error_display() {
        let error = GatewayError::Api {
            status: 403,
            message: "USER_PERMISSION_DENIED".to_string(),
        };
        assert_eq!(error.to_string(), "API error 403: USER_PERMISSION_DENIED");
    }

    #[test]
    fn test_report_error_wraps_validation() {
        let error: ReportError = ValidationError::MissingParameter("email".to_string()).into();
        assert_eq!(error.to_string(), "Missing required parameter: email");
    }
}
