//! Leaderboard aggregation

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    catalog::ContestCatalog,
    db::repositories::{ContestRepository, SubmissionRepository},
    error::AppResult,
    handlers::contests::response::LeaderboardResponse,
    models::{ContestStatus, ScoredAttempt, Standing},
    services::ContestService,
};

/// Leaderboard service
pub struct LeaderboardService;

impl LeaderboardService {
    /// Standings of a contest; empty until the contest has been started
    pub async fn leaderboard(
        pool: &PgPool,
        catalog: &ContestCatalog,
        slug: &str,
    ) -> AppResult<LeaderboardResponse> {
        ContestService::definition(catalog, slug)?;

        let session = ContestRepository::find_by_slug(pool, slug).await?;
        let status = ContestStatus::of(session.as_ref(), Utc::now());

        let standings = match session {
            Some(session) => rank(SubmissionRepository::best_attempts(pool, &session.id).await?),
            None => Vec::new(),
        };

        Ok(LeaderboardResponse {
            slug: slug.to_string(),
            status,
            standings,
        })
    }
}

struct Entry {
    username: String,
    /// Best score per task and when it was first reached; ordered so sums are reproducible
    best: BTreeMap<i32, (f64, DateTime<Utc>)>,
    first_seen: DateTime<Utc>,
}

impl Entry {
    fn total(&self) -> f64 {
        self.best.values().map(|(score, _)| score).sum()
    }

    /// Latest of the instants at which each scoring task reached its best
    fn achieved_at(&self) -> DateTime<Utc> {
        self.best
            .values()
            .filter(|(score, _)| *score > 0.0)
            .map(|(_, at)| *at)
            .max()
            .unwrap_or(self.first_seen)
    }
}

/// Rank scored attempts
///
/// Per user and task the highest score counts, the earliest submission winning
/// among equal scores. Totals are ordered descending; ties are broken by the
/// earlier `achieved_at`, then username, then user id. Equal totals share a
/// rank and the next distinct total skips ahead (`1, 1, 3`).
pub fn rank(attempts: impl IntoIterator<Item = ScoredAttempt>) -> Vec<Standing> {
    let mut entries: HashMap<Uuid, Entry> = HashMap::new();

    for attempt in attempts {
        let entry = entries.entry(attempt.user_id).or_insert_with(|| Entry {
            username: attempt.username.clone(),
            best: BTreeMap::new(),
            first_seen: attempt.submitted_at,
        });
        entry.first_seen = entry.first_seen.min(attempt.submitted_at);

        let best = entry
            .best
            .entry(attempt.task)
            .or_insert((attempt.score, attempt.submitted_at));
        let better = attempt.score > best.0
            || (attempt.score == best.0 && attempt.submitted_at < best.1);
        if better {
            *best = (attempt.score, attempt.submitted_at);
        }
    }

    let mut standings: Vec<Standing> = entries
        .into_iter()
        .map(|(user_id, entry)| Standing {
            rank: 0,
            user_id,
            total_score: entry.total(),
            achieved_at: entry.achieved_at(),
            username: entry.username,
        })
        .collect();

    standings.sort_by(|a, b| {
        b.total_score
            .total_cmp(&a.total_score)
            .then(a.achieved_at.cmp(&b.achieved_at))
            .then_with(|| a.username.cmp(&b.username))
            .then(a.user_id.cmp(&b.user_id))
    });

    let mut previous: Option<(f64, u32)> = None;
    for (position, standing) in (1..).zip(standings.iter_mut()) {
        standing.rank = match previous {
            Some((total, rank)) if total == standing.total_score => rank,
            _ => position,
        };
        previous = Some((standing.total_score, standing.rank));
    }

    standings
}
