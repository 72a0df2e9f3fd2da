//! Contest session repository

use sqlx::PgPool;

use crate::{error::AppResult, models::ContestSession};

/// Repository for contest session database operations
pub struct ContestRepository;

impl ContestRepository {
    /// Start a contest session
    ///
    /// A second start for the same slug violates the unique constraint and
    /// surfaces as `AlreadyExists`.
    pub async fn create(
        pool: &PgPool,
        slug: &str,
        duration_seconds: i64,
    ) -> AppResult<ContestSession> {
        let session = sqlx::query_as::<_, ContestSession>(
            r#"
            INSERT INTO contest_sessions (slug, duration_seconds)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(duration_seconds)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Find session by contest slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> AppResult<Option<ContestSession>> {
        let session =
            sqlx::query_as::<_, ContestSession>(r#"SELECT * FROM contest_sessions WHERE slug = $1"#)
                .bind(slug)
                .fetch_optional(pool)
                .await?;

        Ok(session)
    }

    /// List all sessions
    pub async fn list(pool: &PgPool) -> AppResult<Vec<ContestSession>> {
        let sessions = sqlx::query_as::<_, ContestSession>(
            r#"SELECT * FROM contest_sessions ORDER BY started_at"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    }

    /// Delete a session together with everything recorded under it
    pub async fn delete_by_slug(pool: &PgPool, slug: &str) -> AppResult<bool> {
        let result = sqlx::query(r#"DELETE FROM contest_sessions WHERE slug = $1"#)
            .bind(slug)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
