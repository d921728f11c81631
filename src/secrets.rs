//! Secret handling
//!
//! Client secrets, developer tokens, tracker keys and API keys are loaded into
//! `Zeroizing<String>` so they are wiped from memory when dropped.

use std::env;
use tracing::warn;
use zeroize::Zeroizing;

/// Minimum length of an API key (256 bits of entropy)
pub const MIN_API_KEY_LENGTH: usize = 32;

/// Error type for secret loading operations
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    #[error("Secret validation failed: {0}")]
    ValidationFailed(String),
}

/// Load a required secret from an environment variable
pub fn load_secret(env_var_name: &str) -> Result<Zeroizing<String>, SecretError> {
    load_optional_secret(env_var_name)
        .ok_or_else(|| SecretError::EnvVarNotSet(env_var_name.to_string()))
}

/// Load a secret that may legitimately be absent (blank counts as absent)
pub fn load_optional_secret(env_var_name: &str) -> Option<Zeroizing<String>> {
    secret_from(env::var(env_var_name).ok(), env_var_name)
}

/// Wrap a raw value, trimming it and treating blank as missing
pub fn secret_from(raw: Option<String>, name: &str) -> Option<Zeroizing<String>> {
    let raw = Zeroizing::new(raw?);
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        warn!("Secret {} is set but empty, ignoring it", name);
        return None;
    }
    Some(Zeroizing::new(trimmed.to_string()))
}

/// Validate that a secret meets minimum security requirements
pub fn validate_secret_strength(secret: &str, min_length: usize) -> Result<(), SecretError> {
    if secret.len() < min_length {
        return Err(SecretError::ValidationFailed(format!(
            "Secret too short: {} characters (minimum: {})",
            secret.len(),
            min_length
        )));
    }

    let weak_patterns = ["test", "demo", "example", "placeholder", "changeme", "12345"];
    let secret_lower = secret.to_lowercase();

    for pattern in &weak_patterns {
        if secret_lower.contains(pattern) {
            return Err(SecretError::ValidationFailed(format!(
                "Secret contains weak pattern: {}",
                pattern
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength() {
        assert!(validate_secret_strength("short", MIN_API_KEY_LENGTH).is_err());
        assert!(validate_secret_strength("test_api_key_1234567890123456789", 32).is_err());

        let strong_key = "a".repeat(32);
        assert!(validate_secret_strength(&strong_key, MIN_API_KEY_LENGTH).is_ok());
    }

    #[test]
    fn test_secret_from_trims_and_rejects_blank() {
        assert_eq!(
            secret_from(Some("  value ".to_string()), "X").as_deref().map(|s| s.as_str()),
            Some("value")
        );
        assert!(secret_from(Some("   ".to_string()), "X").is_none());
        assert!(secret_from(None, "X").is_none());
    }

    #[test]
    fn test_load_secret_from_env() {
        env::set_var("ADRECON_SECRET_PROBE", "probe_value");
        let result = load_secret("ADRECON_SECRET_PROBE");
        assert_eq!(*result.unwrap(), "probe_value");
        env::remove_var("ADRECON_SECRET_PROBE");
    }

    #[test]
    fn test_load_secret_missing() {
        let result = load_secret("ADRECON_SECRET_NONEXISTENT");
        assert!(matches!(result, Err(SecretError::EnvVarNotSet(_))));
    }
}
