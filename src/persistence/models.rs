use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Google account record in database
#[derive(Clone, FromRow)]
pub struct GoogleAccountRecord {
    pub id: i64,
    pub user_email: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for GoogleAccountRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleAccountRecord")
            .field("id", &self.id)
            .field("user_email", &self.user_email)
            .field("refresh_token", &"***")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}
