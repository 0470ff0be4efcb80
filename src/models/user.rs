use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_staff: bool,
    pub is_active: bool,
}

impl User {
    /// Active user owning the token with this SHA-256 hex digest.
    pub async fn find_by_token_hash(
        db: impl PgExecutor<'_>,
        key_hash: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.is_staff, u.is_active
             FROM auth_tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.key_hash = $1 AND u.is_active = true",
        )
        .bind(key_hash)
        .fetch_optional(db)
        .await
    }
}
