use async_trait::async_trait;
use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

/// Google account authorized through the OAuth consent flow
#[derive(Debug, Clone)]
pub struct StoredAccount {
    pub user_email: String,
    /// May be empty if Google never issued one for this account
    pub refresh_token: Zeroizing<String>,
    pub updated_at: DateTime<Utc>,
}

/// Errors raised by a credential store backend
#[derive(Debug, thiserror::Error)]
pub enum CredentialStoreError {
    #[error("Credential store backend error: {0}")]
    Backend(String),
}

/// Outcome of an upsert, used to word the callback response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// Existing account kept its token because none was supplied
    Unchanged,
    /// Unknown account and no token to store
    Skipped,
}

/// Persistence of Google refresh tokens keyed by user email
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, email: &str) -> Result<Option<StoredAccount>, CredentialStoreError>;

    /// Store a refresh token for an email.
    ///
    /// A `None` token never overwrites an existing one.
    async fn upsert(
        &self,
        email: &str,
        refresh_token: Option<&str>,
    ) -> Result<UpsertOutcome, CredentialStoreError>;
}
