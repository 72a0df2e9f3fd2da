//! Contest service
//!
//! Contest definitions come from the catalog; whether a contest is running
//! comes from its session row.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::PgPool;

use crate::{
    catalog::{ContestCatalog, ContestDefinition},
    db::repositories::ContestRepository,
    error::{AppError, AppResult},
    handlers::contests::response::{
        ContestResponse, ContestSummary, ContestsListResponse, LanguageResponse, TaskResponse,
    },
    models::ContestSession,
};

/// Contest service for business logic
pub struct ContestService;

impl ContestService {
    /// Look up a contest definition by slug
    pub fn definition<'a>(catalog: &'a ContestCatalog, slug: &str) -> AppResult<&'a ContestDefinition> {
        catalog
            .get(slug)
            .ok_or_else(|| AppError::NotFound(format!("Contest '{}' not found", slug)))
    }

    /// List every catalog contest with its session status
    pub async fn list_contests(pool: &PgPool, catalog: &ContestCatalog) -> AppResult<ContestsListResponse> {
        let sessions: HashMap<String, ContestSession> = ContestRepository::list(pool)
            .await?
            .into_iter()
            .map(|s| (s.slug.clone(), s))
            .collect();

        let now = Utc::now();
        let contests: Vec<ContestSummary> = catalog
            .iter()
            .map(|(slug, contest)| ContestSummary::new(slug, contest, sessions.get(slug), now))
            .collect();

        Ok(ContestsListResponse {
            total: contests.len(),
            contests,
        })
    }

    /// Get contest detail by slug
    pub async fn get_contest(
        pool: &PgPool,
        catalog: &ContestCatalog,
        slug: &str,
    ) -> AppResult<ContestResponse> {
        let contest = Self::definition(catalog, slug)?;
        let session = ContestRepository::find_by_slug(pool, slug).await?;

        Ok(ContestResponse {
            summary: ContestSummary::new(slug, contest, session.as_ref(), Utc::now()),
            submission_cooldown: contest.submission_cooldown,
            scoring: contest.scoring,
            resource_limits: contest.judge.resource_limits,
            languages: contest.judge.languages.iter().map(LanguageResponse::from).collect(),
            tasks: contest
                .tasks
                .iter()
                .zip(1..)
                .map(|(task, number)| TaskResponse::new(number, task))
                .collect(),
        })
    }

    /// Start a contest now, with the duration its definition declares
    pub async fn start_contest(
        pool: &PgPool,
        catalog: &ContestCatalog,
        slug: &str,
    ) -> AppResult<ContestSession> {
        let contest = Self::definition(catalog, slug)?;
        let duration_seconds = i64::try_from(contest.duration).map_err(|_| {
            AppError::Configuration(format!("Contest '{}' duration is out of range", slug))
        })?;

        let session = ContestRepository::create(pool, slug, duration_seconds)
            .await
            .map_err(|e| match e {
                AppError::AlreadyExists(_) => {
                    AppError::Conflict(format!("Contest '{}' has already been started", slug))
                }
                other => other,
            })?;

        tracing::info!(
            slug = %slug,
            session_id = %session.id,
            ends_at = %session.ends_at(),
            "Contest started"
        );

        Ok(session)
    }

    /// Remove a contest session and everything submitted under it
    pub async fn remove_session(pool: &PgPool, catalog: &ContestCatalog, slug: &str) -> AppResult<()> {
        Self::definition(catalog, slug)?;

        if !ContestRepository::delete_by_slug(pool, slug).await? {
            return Err(AppError::NotFound(format!("Contest '{}' has no session", slug)));
        }

        tracing::warn!(slug = %slug, "Contest session removed with its submissions");
        Ok(())
    }
}
