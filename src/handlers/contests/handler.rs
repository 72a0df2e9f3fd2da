//! Contest handler implementations

use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    error::AppResult,
    services::{ContestService, LeaderboardService},
    state::AppState,
};

use super::response::{ContestResponse, ContestsListResponse, LeaderboardResponse};

/// List all contests
pub async fn list_contests(State(state): State<AppState>) -> AppResult<Json<ContestsListResponse>> {
    let contests = ContestService::list_contests(state.db(), state.catalog()).await?;
    Ok(Json(contests))
}

/// Get a specific contest
pub async fn get_contest(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ContestResponse>> {
    let contest = ContestService::get_contest(state.db(), state.catalog(), &slug).await?;
    Ok(Json(contest))
}

/// Get contest leaderboard
pub async fn get_leaderboard(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<LeaderboardResponse>> {
    let leaderboard = LeaderboardService::leaderboard(state.db(), state.catalog(), &slug).await?;
    Ok(Json(leaderboard))
}
