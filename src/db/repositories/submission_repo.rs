//! Submission repository

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{NewTestOutcome, ScoredAttempt, Submission, TestOutcome},
};

/// Rows per multi-value insert; six binds each keeps well under the
/// Postgres limit of 65535 parameters per statement.
const OUTCOME_BATCH_ROWS: usize = 1000;

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Insert a graded submission
    ///
    /// Takes a connection so the caller can run it inside a transaction.
    pub async fn insert(
        conn: &mut PgConnection,
        id: &Uuid,
        user_id: &Uuid,
        contest_id: &Uuid,
        task: i32,
        code: &str,
        language: &str,
        score: f64,
        verdict: &str,
    ) -> sqlx::Result<Submission> {
        sqlx::query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (id, user_id, contest_id, task, code, language, score, verdict)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(contest_id)
        .bind(task)
        .bind(code)
        .bind(language)
        .bind(score)
        .bind(verdict)
        .fetch_one(conn)
        .await
    }

    /// Insert the per-test outcomes of a submission
    pub async fn insert_outcomes(
        conn: &mut PgConnection,
        submission_id: &Uuid,
        outcomes: &[NewTestOutcome],
    ) -> sqlx::Result<()> {
        for batch in outcomes.chunks(OUTCOME_BATCH_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                r#"INSERT INTO test_outcomes (submission_id, subtask, "index", runtime_millis, memory_bytes, verdict) "#,
            );
            builder.push_values(batch, |mut row, outcome| {
                row.push_bind(submission_id)
                    .push_bind(outcome.subtask)
                    .push_bind(outcome.index)
                    .push_bind(outcome.runtime_millis)
                    .push_bind(outcome.memory_bytes)
                    .push_bind(outcome.verdict.as_str());
            });
            builder.build().execute(&mut *conn).await?;
        }

        Ok(())
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<Submission>> {
        let submission =
            sqlx::query_as::<_, Submission>(r#"SELECT * FROM submissions WHERE id = $1"#)
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Ok(submission)
    }

    /// Test outcomes of a submission in report order
    pub async fn outcomes_for(pool: &PgPool, submission_id: &Uuid) -> AppResult<Vec<TestOutcome>> {
        let outcomes = sqlx::query_as::<_, TestOutcome>(
            r#"
            SELECT * FROM test_outcomes
            WHERE submission_id = $1
            ORDER BY subtask, "index"
            "#,
        )
        .bind(submission_id)
        .fetch_all(pool)
        .await?;

        Ok(outcomes)
    }

    /// A user's submissions for one task, newest first
    pub async fn history(
        pool: &PgPool,
        user_id: &Uuid,
        contest_id: &Uuid,
        task: i32,
    ) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, Submission>(
            r#"
            SELECT * FROM submissions
            WHERE user_id = $1 AND contest_id = $2 AND task = $3
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .bind(contest_id)
        .bind(task)
        .fetch_all(pool)
        .await?;

        Ok(submissions)
    }

    /// Best attempt of every (user, task) pair in a contest
    ///
    /// Among equal scores the earliest submission wins, which is when the
    /// best score was first reached.
    pub async fn best_attempts(pool: &PgPool, contest_id: &Uuid) -> AppResult<Vec<ScoredAttempt>> {
        let attempts = sqlx::query_as::<_, ScoredAttempt>(
            r#"
            SELECT DISTINCT ON (s.user_id, s.task)
                s.user_id, u.username, s.task, s.score, s.submitted_at
            FROM submissions s
            JOIN users u ON u.id = s.user_id
            WHERE s.contest_id = $1
            ORDER BY s.user_id, s.task, s.score DESC, s.submitted_at ASC
            "#,
        )
        .bind(contest_id)
        .fetch_all(pool)
        .await?;

        Ok(attempts)
    }
}
