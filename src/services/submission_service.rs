//! Submission service
//!
//! Validates an attempt, takes its cooldown admission, then either grades a
//! free-form answer in process or hands the code to the judge and relays the
//! judge's event stream back to the caller.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    catalog::{ContestCatalog, ContestDefinition, Language, TaskDefinition},
    constants::ANSWER_LANGUAGE,
    db::repositories::{AdmissionRepository, ContestRepository, SubmissionRepository, UserRepository},
    error::{AppError, AppResult},
    handlers::submissions::{request::SubmitForm, response::SubmissionResponse},
    judge::{JudgeError, JudgeRequest, PendingSubmission, RelayHandle, relay},
    middleware::auth::AuthenticatedUser,
    models::{ContestSession, Submission, SubmissionDetail},
    services::{
        ContestService, ScoringService,
        result_writer::{Graded, NewSubmission},
    },
    state::AppState,
};

/// What became of an accepted attempt
pub enum Dispatch {
    /// Answer graded in process and stored
    Graded(SubmissionResponse),
    /// The judge accepted the code; its event stream is being relayed
    Relayed(RelayHandle),
    /// The judge refused the request; its response is passed through unchanged
    Rejected(reqwest::Response),
}

/// Validated content of an attempt
#[derive(Debug)]
enum Entry<'a> {
    Answer { answer: String, expected: &'a str },
    Code { language: &'a Language, code: String },
}

/// Submission service for business logic
pub struct SubmissionService;

impl SubmissionService {
    /// Submit an attempt at task `task` (1-based) of contest `slug`
    pub async fn submit(
        state: &AppState,
        user: &AuthenticatedUser,
        slug: &str,
        task: i32,
        form: SubmitForm,
    ) -> AppResult<Dispatch> {
        let pool = state.db();
        let contest = ContestService::definition(state.catalog(), slug)?;

        let session = ContestRepository::find_by_slug(pool, slug)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Contest '{}' has not started", slug)))?;
        // Postgres keeps microseconds and admissions are released by exact instant
        let now = Utc::now().trunc_subsecs(6);
        if !session.accepts_submissions(now) {
            return Err(AppError::Validation(format!("Contest '{}' has ended", slug)));
        }

        let task_def = contest
            .task(task)
            .ok_or_else(|| AppError::NotFound(format!("Task {} not found", task)))?;
        let entry = classify(contest, task_def, form)?;

        UserRepository::ensure(pool, &user.id, &user.username)
            .await
            .map_err(|e| match e {
                AppError::AlreadyExists(_) => {
                    AppError::Conflict(format!("Username '{}' belongs to another user", user.username))
                }
                other => other,
            })?;

        let admitted_at = admit(pool, user.id, &session, task, now, contest.submission_cooldown).await?;

        match entry {
            Entry::Answer { answer, expected } => {
                let (score, verdict) = ScoringService::score_answer(&answer, expected, &contest.scoring);
                let submission = NewSubmission {
                    user_id: user.id,
                    contest_id: session.id,
                    task,
                    code: answer,
                    language: ANSWER_LANGUAGE.to_string(),
                    graded: Graded::Answer { verdict, score },
                };

                let id = state.writer().persist(submission).await?;
                let stored = SubmissionRepository::find_by_id(pool, &id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

                Ok(Dispatch::Graded(stored.into()))
            }
            Entry::Code { language, code } => {
                let request = JudgeRequest {
                    contest: slug.to_string(),
                    task,
                    language: language.name.clone(),
                    file_extension: language.file_extension.clone(),
                    code: code.clone(),
                };

                let response = match state.judge().submit(request).await {
                    Ok(response) => response,
                    Err(e) => {
                        release(pool, user.id, &session, task, admitted_at).await;
                        return Err(match e {
                            JudgeError::Unreachable(e) => AppError::UpstreamUnavailable(e.to_string()),
                            JudgeError::Build(e) => AppError::Internal(e.into()),
                        });
                    }
                };

                if !response.status().is_success() {
                    tracing::warn!(
                        status = response.status().as_u16(),
                        slug = %slug,
                        task,
                        "Judge rejected submission"
                    );
                    release(pool, user.id, &session, task, admitted_at).await;
                    return Ok(Dispatch::Rejected(response));
                }

                tracing::info!(user_id = %user.id, slug = %slug, task, language = %language.name, "Relaying judge stream");

                let pending = PendingSubmission {
                    user_id: user.id,
                    contest_id: session.id,
                    task,
                    code,
                    language: language.name.clone(),
                    scoring: contest.scoring,
                };

                Ok(Dispatch::Relayed(relay::spawn(
                    response.bytes_stream(),
                    pending,
                    state.writer(),
                    state.config().judge.relay_buffer_chunks,
                )))
            }
        }
    }

    /// The caller's submissions for a task, newest first
    pub async fn history(
        pool: &PgPool,
        catalog: &ContestCatalog,
        user: &AuthenticatedUser,
        slug: &str,
        task: i32,
    ) -> AppResult<Vec<Submission>> {
        let contest = ContestService::definition(catalog, slug)?;
        if contest.task(task).is_none() {
            return Err(AppError::NotFound(format!("Task {} not found", task)));
        }

        match ContestRepository::find_by_slug(pool, slug).await? {
            Some(session) => SubmissionRepository::history(pool, &user.id, &session.id, task).await,
            None => Ok(Vec::new()),
        }
    }

    /// A submission with its ordered test outcomes; owner or admin only
    pub async fn detail(pool: &PgPool, user: &AuthenticatedUser, id: &Uuid) -> AppResult<SubmissionDetail> {
        let submission = SubmissionRepository::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        if submission.user_id != user.id && !user.is_admin() {
            return Err(AppError::Forbidden("Not your submission".to_string()));
        }

        let tests = SubmissionRepository::outcomes_for(pool, id).await?;
        Ok(SubmissionDetail { submission, tests })
    }
}

/// Check the form against the kind of task it targets
fn classify<'a>(
    contest: &'a ContestDefinition,
    task: &'a TaskDefinition,
    form: SubmitForm,
) -> AppResult<Entry<'a>> {
    if let Some(expected) = task.answer.as_deref() {
        if form.code.is_some() {
            return Err(AppError::Validation("This task takes an answer, not code".to_string()));
        }
        let answer = form
            .answer
            .ok_or_else(|| AppError::Validation("answer is required".to_string()))?;
        return Ok(Entry::Answer { answer, expected });
    }

    if form.answer.is_some() {
        return Err(AppError::Validation("This task takes code, not an answer".to_string()));
    }
    let code = form
        .code
        .ok_or_else(|| AppError::Validation("code is required".to_string()))?;
    let name = form
        .language
        .ok_or_else(|| AppError::Validation("language is required".to_string()))?;
    let language = contest
        .language(&name)
        .ok_or_else(|| AppError::Validation(format!("Unsupported language: {}", name)))?;

    Ok(Entry::Code { language, code })
}

/// Take the cooldown admission for this attempt
///
/// Returns the admission instant so it can be released if the judge is never reached.
async fn admit(
    pool: &PgPool,
    user_id: Uuid,
    session: &ContestSession,
    task: i32,
    now: DateTime<Utc>,
    cooldown_secs: u64,
) -> AppResult<DateTime<Utc>> {
    if AdmissionRepository::try_admit(pool, &user_id, &session.id, task, now, cooldown_secs).await? {
        return Ok(now);
    }

    let last = AdmissionRepository::last_admitted(pool, &user_id, &session.id, task).await?;
    let retry_after_secs = last
        .and_then(|last| cooldown_remaining(last, now, cooldown_secs))
        .unwrap_or(1);

    tracing::debug!(user_id = %user_id, task, retry_after_secs, "Submission refused by cooldown");
    Err(AppError::CooldownActive { retry_after_secs })
}

/// Give the admission back when the judge never took the attempt
async fn release(
    pool: &PgPool,
    user_id: Uuid,
    session: &ContestSession,
    task: i32,
    admitted_at: DateTime<Utc>,
) {
    if let Err(e) = AdmissionRepository::release(pool, &user_id, &session.id, task, admitted_at).await {
        tracing::error!(error = %e, user_id = %user_id, task, "Failed to release submission admission");
    }
}

/// Whole seconds left before another attempt is allowed, if any
pub fn cooldown_remaining(last: DateTime<Utc>, now: DateTime<Utc>, cooldown_secs: u64) -> Option<u64> {
    let until = i64::try_from(cooldown_secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|cooldown| last.checked_add_signed(cooldown))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let remaining = until - now;
    if remaining <= chrono::Duration::zero() {
        return None;
    }

    let millis = remaining.num_milliseconds().max(1) as u64;
    Some(millis.div_ceil(1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures;
    use chrono::Duration;

    fn form(language: Option<&str>, code: Option<&str>, answer: Option<&str>) -> SubmitForm {
        SubmitForm {
            language: language.map(str::to_string),
            code: code.map(str::to_string),
            answer: answer.map(str::to_string),
        }
    }

    #[test]
    fn test_code_task_needs_known_language() {
        let contest = fixtures::contest();
        let task = contest.task(1).unwrap();

        let entry = classify(&contest, task, form(Some("Python"), Some("print(3)"), None)).unwrap();
        assert!(matches!(entry, Entry::Code { language, .. } if language.file_extension == "py"));

        assert!(classify(&contest, task, form(Some("Cobol"), Some("x"), None)).is_err());
        assert!(classify(&contest, task, form(None, Some("x"), None)).is_err());
        assert!(classify(&contest, task, form(Some("Python"), None, None)).is_err());
        assert!(classify(&contest, task, form(Some("Python"), Some("x"), Some("42"))).is_err());
    }

    #[test]
    fn test_answer_task_takes_answer_only() {
        let contest = fixtures::contest();
        let task = contest.task(2).unwrap();

        let entry = classify(&contest, task, form(None, None, Some("forty two"))).unwrap();
        assert!(matches!(entry, Entry::Answer { expected, .. } if expected.trim() == "forty two"));

        assert!(classify(&contest, task, form(None, None, None)).is_err());
        assert!(classify(&contest, task, form(Some("Python"), Some("x"), Some("42"))).is_err());
    }

    #[test]
    fn test_cooldown_remaining() {
        let last = Utc::now();

        assert_eq!(cooldown_remaining(last, last, 30), Some(30));
        assert_eq!(cooldown_remaining(last, last + Duration::milliseconds(29_500), 30), Some(1));
        assert_eq!(cooldown_remaining(last, last + Duration::seconds(30), 30), None);
        assert_eq!(cooldown_remaining(last, last + Duration::seconds(45), 30), None);
        assert_eq!(cooldown_remaining(last, last, 0), None);
        assert!(cooldown_remaining(last, last, u64::MAX).is_some());
    }
}
