//! Transactional persistence of graded submissions

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    catalog::ScoringConfig,
    db::repositories::SubmissionRepository,
    judge::{Report, Verdict},
    models::NewTestOutcome,
    services::ScoringService,
};

/// Failure to persist a graded submission; nothing was written
#[derive(Debug, thiserror::Error)]
#[error("failed to persist submission: {0}")]
pub struct PersistenceError(#[from] sqlx::Error);

/// How a submission was graded
#[derive(Debug, Clone)]
pub enum Graded {
    /// Judged by the upstream judge
    Report { report: Report, scoring: ScoringConfig },
    /// Free-form answer compared in process; carries no test rows
    Answer { verdict: Verdict, score: f64 },
}

impl Graded {
    pub fn score(&self) -> f64 {
        match self {
            Self::Report { report, scoring } => ScoringService::score(report, scoring),
            Self::Answer { score, .. } => *score,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            Self::Report { report, .. } => report.task,
            Self::Answer { verdict, .. } => *verdict,
        }
    }

    pub fn outcomes(&self) -> Vec<NewTestOutcome> {
        match self {
            Self::Report { report, .. } => NewTestOutcome::from_report(report),
            Self::Answer { .. } => Vec::new(),
        }
    }
}

/// A submission ready to be stored
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub task: i32,
    pub code: String,
    pub language: String,
    pub graded: Graded,
}

/// Sink for graded submissions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResultWriter: Send + Sync {
    /// Store the submission and all of its test outcomes, or nothing
    async fn persist(&self, submission: NewSubmission) -> Result<Uuid, PersistenceError>;
}

/// Postgres backed writer
#[derive(Debug, Clone)]
pub struct PgResultWriter {
    pool: PgPool,
}

impl PgResultWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultWriter for PgResultWriter {
    async fn persist(&self, submission: NewSubmission) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        let score = submission.graded.score();
        let verdict = submission.graded.verdict();
        let outcomes = submission.graded.outcomes();

        // Dropping the transaction without commit rolls everything back
        let mut tx = self.pool.begin().await?;

        SubmissionRepository::insert(
            &mut tx,
            &id,
            &submission.user_id,
            &submission.contest_id,
            submission.task,
            &submission.code,
            &submission.language,
            score,
            verdict.as_str(),
        )
        .await?;
        SubmissionRepository::insert_outcomes(&mut tx, &id, &outcomes).await?;

        tx.commit().await?;

        tracing::info!(
            submission_id = %id,
            user_id = %submission.user_id,
            task = submission.task,
            score,
            verdict = %verdict,
            tests = outcomes.len(),
            "Submission persisted"
        );

        Ok(id)
    }
}
