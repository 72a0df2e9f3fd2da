//! Contest session model

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A started contest
///
/// The duration is copied from the contest definition when the session starts,
/// so later edits to the definition do not move a running contest's deadline.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ContestSession {
    pub id: Uuid,
    pub slug: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl ContestSession {
    /// Instant at which submissions stop being accepted
    ///
    /// Saturates at the latest representable instant.
    pub fn ends_at(&self) -> DateTime<Utc> {
        TimeDelta::try_seconds(self.duration_seconds)
            .and_then(|span| self.started_at.checked_add_signed(span))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Submissions are accepted while `now < started_at + duration`
    pub fn accepts_submissions(&self, now: DateTime<Utc>) -> bool {
        now < self.ends_at()
    }

    pub fn status(&self, now: DateTime<Utc>) -> ContestStatus {
        if self.accepts_submissions(now) {
            ContestStatus::Running
        } else {
            ContestStatus::Ended
        }
    }
}

/// Contest status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    NotStarted,
    Running,
    Ended,
}

impl ContestStatus {
    pub fn of(session: Option<&ContestSession>, now: DateTime<Utc>) -> Self {
        session.map_or(Self::NotStarted, |s| s.status(now))
    }
}

impl std::fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Ended => write!(f, "ended"),
        }
    }
}
