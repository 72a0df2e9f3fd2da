//! Contest response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    catalog::{ContestDefinition, Difficulty, Language, ResourceLimits, ScoringConfig, TaskDefinition},
    models::{ContestSession, ContestStatus, Standing},
};

/// Contest list entry
#[derive(Debug, Serialize)]
pub struct ContestSummary {
    pub slug: String,
    pub name: String,
    pub page: Option<String>,
    /// Duration in seconds
    pub duration: u64,
    pub status: ContestStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub task_count: usize,
}

impl ContestSummary {
    pub fn new(
        slug: &str,
        contest: &ContestDefinition,
        session: Option<&ContestSession>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            slug: slug.to_string(),
            name: contest.name.clone(),
            page: contest.page.clone(),
            duration: contest.duration,
            status: ContestStatus::of(session, now),
            started_at: session.map(|s| s.started_at),
            ends_at: session.map(ContestSession::ends_at),
            task_count: contest.tasks.len(),
        }
    }
}

/// Contest list response
#[derive(Debug, Serialize)]
pub struct ContestsListResponse {
    pub contests: Vec<ContestSummary>,
    pub total: usize,
}

/// Full contest description
///
/// Test data and expected answers are never exposed.
#[derive(Debug, Serialize)]
pub struct ContestResponse {
    #[serde(flatten)]
    pub summary: ContestSummary,
    pub submission_cooldown: u64,
    pub scoring: ScoringConfig,
    pub resource_limits: ResourceLimits,
    pub languages: Vec<LanguageResponse>,
    pub tasks: Vec<TaskResponse>,
}

/// Language available for code tasks
#[derive(Debug, Serialize)]
pub struct LanguageResponse {
    pub name: String,
    pub file_extension: String,
    pub compiled: bool,
}

impl From<&Language> for LanguageResponse {
    fn from(language: &Language) -> Self {
        Self {
            name: language.name.clone(),
            file_extension: language.file_extension.clone(),
            compiled: language.compile.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Code,
    Answer,
}

/// Task as shown to contestants
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// 1-based task number used in submission routes
    pub number: i32,
    pub name: String,
    pub difficulty: Difficulty,
    pub page: Option<String>,
    pub kind: TaskKind,
    pub subtasks: usize,
    pub tests: usize,
}

impl TaskResponse {
    pub fn new(number: i32, task: &TaskDefinition) -> Self {
        let kind = if task.is_answer_task() {
            TaskKind::Answer
        } else {
            TaskKind::Code
        };

        Self {
            number,
            name: task.name.clone(),
            difficulty: task.difficulty,
            page: task.page.clone(),
            kind,
            subtasks: task.subtasks.len(),
            tests: task.test_count(),
        }
    }
}

/// Ranked standings of a contest
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub slug: String,
    pub status: ContestStatus,
    pub standings: Vec<Standing>,
}
