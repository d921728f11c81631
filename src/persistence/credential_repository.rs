use super::models::GoogleAccountRecord;
use super::{DatabaseError, DbPool};
use crate::domain::repositories::credential_store::{
    CredentialStore, CredentialStoreError, StoredAccount, UpsertOutcome,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error};
use zeroize::Zeroizing;

/// Google account repository
pub struct SqliteCredentialRepository {
    pool: DbPool,
}

impl SqliteCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get account by email
    pub async fn get_by_email(
        &self,
        email: &str,
    ) -> Result<Option<GoogleAccountRecord>, DatabaseError> {
        sqlx::query_as::<_, GoogleAccountRecord>(
            "SELECT * FROM google_accounts WHERE user_email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get Google account {}: {}", email, e);
            DatabaseError::QueryError(format!("Failed to get Google account: {}", e))
        })
    }

    /// Insert or refresh the token for an email inside one transaction
    pub async fn save_refresh_token(
        &self,
        email: &str,
        refresh_token: Option<&str>,
    ) -> Result<UpsertOutcome, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM google_accounts WHERE user_email = ?1")
                .bind(email)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to look up Google account {}: {}", email, e);
                    DatabaseError::QueryError(format!("Failed to look up Google account: {}", e))
                })?;

        let token = refresh_token.filter(|token| !token.is_empty());
        let now = Utc::now();
        let outcome = match (existing, token) {
            (Some(_), None) => UpsertOutcome::Unchanged,
            (None, None) => UpsertOutcome::Skipped,
            (Some((id,)), Some(token)) => {
                sqlx::query(
                    "UPDATE google_accounts SET refresh_token = ?1, updated_at = ?2 WHERE id = ?3",
                )
                .bind(token)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to update Google account {}: {}", email, e);
                    DatabaseError::QueryError(format!("Failed to update Google account: {}", e))
                })?;
                UpsertOutcome::Updated
            }
            (None, Some(token)) => {
                sqlx::query(
                    r#"
                    INSERT INTO google_accounts (user_email, refresh_token, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?3)
                    "#,
                )
                .bind(email)
                .bind(token)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to create Google account {}: {}", email, e);
                    DatabaseError::QueryError(format!("Failed to create Google account: {}", e))
                })?;
                UpsertOutcome::Created
            }
        };

        tx.commit().await?;
        debug!("Saved Google account {}: {:?}", email, outcome);
        Ok(outcome)
    }
}

impl From<DatabaseError> for CredentialStoreError {
    fn from(e: DatabaseError) -> Self {
        CredentialStoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialRepository {
    async fn find(&self, email: &str) -> Result<Option<StoredAccount>, CredentialStoreError> {
        let record = self.get_by_email(email).await?;
        Ok(record.map(|record| StoredAccount {
            user_email: record.user_email,
            refresh_token: Zeroizing::new(record.refresh_token),
            updated_at: record.updated_at,
        }))
    }

    async fn upsert(
        &self,
        email: &str,
        refresh_token: Option<&str>,
    ) -> Result<UpsertOutcome, CredentialStoreError> {
        Ok(self.save_refresh_token(email, refresh_token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::init_database;

    async fn repository() -> SqliteCredentialRepository {
        let pool = init_database("sqlite::memory:").await.unwrap();
        SqliteCredentialRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = repository().await;

        let outcome = repo.upsert("ops@agency.io", Some("rt-1")).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Created);

        let account = repo.find("ops@agency.io").await.unwrap().unwrap();
        assert_eq!(account.user_email, "ops@agency.io");
        assert_eq!(account.refresh_token.as_str(), "rt-1");
    }

    #[tokio::test]
    async fn test_update_replaces_token() {
        let repo = repository().await;
        repo.upsert("ops@agency.io", Some("rt-1")).await.unwrap();

        let outcome = repo.upsert("ops@agency.io", Some("rt-2")).await.unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        let account = repo.find("ops@agency.io").await.unwrap().unwrap();
        assert_eq!(account.refresh_token.as_str(), "rt-2");
    }

    #[tokio::test]
    async fn test_missing_token_keeps_existing() {
        let repo = repository().await;
        repo.upsert("ops@agency.io", Some("rt-1")).await.unwrap();

        assert_eq!(
            repo.upsert("ops@agency.io", None).await.unwrap(),
            UpsertOutcome::Unchanged
        );
        assert_eq!(
            repo.upsert("ops@agency.io", Some("")).await.unwrap(),
            UpsertOutcome::Unchanged
        );
        let account = repo.find("ops@agency.io").await.unwrap().unwrap();
        assert_eq!(account.refresh_token.as_str(), "rt-1");
    }

    #[tokio::test]
    async fn test_unknown_email_without_token_is_skipped() {
        let repo = repository().await;

        assert_eq!(
            repo.upsert("new@agency.io", None).await.unwrap(),
            UpsertOutcome::Skipped
        );
        assert!(repo.find("new@agency.io").await.unwrap().is_none());
    }
}
