//! Admin response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::ContestSession;

/// Started contest session
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub slug: String,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub duration_seconds: i64,
}

impl From<ContestSession> for SessionResponse {
    fn from(session: ContestSession) -> Self {
        Self {
            ends_at: session.ends_at(),
            id: session.id,
            slug: session.slug,
            started_at: session.started_at,
            duration_seconds: session.duration_seconds,
        }
    }
}
