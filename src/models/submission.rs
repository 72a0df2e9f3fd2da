//! Submission and test outcome models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::judge::{Report, Verdict};

/// Submission database model
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub contest_id: Uuid,
    pub task: i32,
    #[serde(skip_serializing)]
    pub code: String,
    pub language: String,
    pub score: f64,
    pub verdict: String,
    pub submitted_at: DateTime<Utc>,
}

/// Outcome of one test of a submission
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TestOutcome {
    pub submission_id: Uuid,
    pub subtask: i32,
    pub index: i32,
    pub runtime_millis: f64,
    pub memory_bytes: i64,
    pub verdict: String,
}

/// Test outcome row prepared for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestOutcome {
    pub subtask: i32,
    pub index: i32,
    pub runtime_millis: f64,
    pub memory_bytes: i64,
    pub verdict: Verdict,
}

impl NewTestOutcome {
    /// Flatten a report into rows
    ///
    /// Positions are 1-based and come from the report's nesting, never from
    /// the test reports themselves.
    pub fn from_report(report: &Report) -> Vec<Self> {
        report
            .tests
            .iter()
            .zip(1..)
            .flat_map(|(tests, subtask)| {
                tests.iter().zip(1..).map(move |(test, index)| Self {
                    subtask,
                    index,
                    runtime_millis: test.resource_usage.runtime_millis(),
                    memory_bytes: i64::try_from(test.resource_usage.memory).unwrap_or(i64::MAX),
                    verdict: test.verdict,
                })
            })
            .collect()
    }
}

/// Submission with its ordered test outcomes
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub tests: Vec<TestOutcome>,
}
