//! User repository
//!
//! Accounts belong to the identity service. Rows here only mirror the token
//! claims so submissions and leaderboards can reference users.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Record the user named by a token, following username changes
    pub async fn ensure(pool: &PgPool, id: &Uuid, username: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
                SET username = EXCLUDED.username
                WHERE users.username <> EXCLUDED.username
            "#,
        )
        .bind(id)
        .bind(username)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Username on record
    pub async fn username(pool: &PgPool, id: &Uuid) -> AppResult<Option<String>> {
        let username = sqlx::query_scalar(r#"SELECT username FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(username)
    }
}
