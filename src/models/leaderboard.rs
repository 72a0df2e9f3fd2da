//! Leaderboard models

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One scored attempt of a user on a task, as read for ranking
#[derive(Debug, Clone, FromRow)]
pub struct ScoredAttempt {
    pub user_id: Uuid,
    pub username: String,
    pub task: i32,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// A user's position on the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub rank: u32,
    pub user_id: Uuid,
    pub username: String,
    pub total_score: f64,
    /// When the user first reached their current total
    pub achieved_at: DateTime<Utc>,
}
