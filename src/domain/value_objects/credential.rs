use crate::domain::errors::ValidationError;
use zeroize::Zeroizing;

/// OAuth2 refresh token authorizing Google Ads calls on behalf of a user.
///
/// The token is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct Credential(Zeroizing<String>);

impl Credential {
    pub fn new(token: impl Into<String>) -> Result<Self, ValidationError> {
        let token = Zeroizing::new(token.into());
        if token.trim().is_empty() {
            return Err(ValidationError::EmptyCredential);
        }
        Ok(Self(token))
    }

    /// Raw token, only for building outbound requests
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_rejects_blank() {
        assert_eq!(
            Credential::new("   ").unwrap_err(),
            ValidationError::EmptyCredential
        );
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("1//refresh-token").unwrap();
        assert_eq!(format!("{:?}", credential), "Credential(***)");
        assert_eq!(credential.expose(), "1//refresh-token");
    }
}
