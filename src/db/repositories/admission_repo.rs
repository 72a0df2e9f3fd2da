//! Submission admission repository
//!
//! One row per (user, contest, task) holding the instant of the most recent
//! admitted attempt. Admission is a single conditional upsert, so concurrent
//! attempts inside the cooldown window cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Repository for cooldown admissions
pub struct AdmissionRepository;

impl AdmissionRepository {
    /// Admit an attempt at `now` unless the previous one is younger than the cooldown
    ///
    /// Returns `true` when the attempt was admitted.
    pub async fn try_admit(
        pool: &PgPool,
        user_id: &Uuid,
        contest_id: &Uuid,
        task: i32,
        now: DateTime<Utc>,
        cooldown_secs: u64,
    ) -> AppResult<bool> {
        let admitted: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            INSERT INTO submission_admissions (user_id, contest_id, task, admitted_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, contest_id, task) DO UPDATE
                SET admitted_at = EXCLUDED.admitted_at
                WHERE submission_admissions.admitted_at
                    <= EXCLUDED.admitted_at - make_interval(secs => $5)
            RETURNING admitted_at
            "#,
        )
        .bind(user_id)
        .bind(contest_id)
        .bind(task)
        .bind(now)
        .bind(cooldown_secs as f64)
        .fetch_optional(pool)
        .await?;

        Ok(admitted.is_some())
    }

    /// Instant of the most recent admitted attempt
    pub async fn last_admitted(
        pool: &PgPool,
        user_id: &Uuid,
        contest_id: &Uuid,
        task: i32,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let admitted_at = sqlx::query_scalar(
            r#"
            SELECT admitted_at FROM submission_admissions
            WHERE user_id = $1 AND contest_id = $2 AND task = $3
            "#,
        )
        .bind(user_id)
        .bind(contest_id)
        .bind(task)
        .fetch_optional(pool)
        .await?;

        Ok(admitted_at)
    }

    /// Give back an admission whose attempt never reached the judge
    ///
    /// Matches on `admitted_at` so a newer admission is never removed.
    pub async fn release(
        pool: &PgPool,
        user_id: &Uuid,
        contest_id: &Uuid,
        task: i32,
        admitted_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM submission_admissions
            WHERE user_id = $1 AND contest_id = $2 AND task = $3 AND admitted_at = $4
            "#,
        )
        .bind(user_id)
        .bind(contest_id)
        .bind(task)
        .bind(admitted_at)
        .execute(pool)
        .await?;

        Ok(())
    }
}
