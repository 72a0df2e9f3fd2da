//! Submission response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Submission;

/// Stored submission without its code
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: Uuid,
    pub task: i32,
    pub language: String,
    pub score: f64,
    pub verdict: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionResponse {
    fn from(s: Submission) -> Self {
        Self {
            id: s.id,
            task: s.task,
            language: s.language,
            score: s.score,
            verdict: s.verdict,
            submitted_at: s.submitted_at,
        }
    }
}

/// A caller's submissions for one task, newest first
#[derive(Debug, Serialize)]
pub struct SubmissionsListResponse {
    pub submissions: Vec<SubmissionResponse>,
    pub total: usize,
}
