//! Admin handler implementations

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::AppResult, middleware::auth::AdminUser, services::ContestService, state::AppState,
};

use super::response::SessionResponse;

/// Start a contest
pub async fn start_contest(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<SessionResponse>)> {
    let session = ContestService::start_contest(state.db(), state.catalog(), &slug).await?;
    tracing::info!(admin = %admin.username, slug = %slug, "Contest session created");

    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Remove a contest session and its submissions
pub async fn remove_contest_session(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    ContestService::remove_session(state.db(), state.catalog(), &slug).await?;
    tracing::info!(admin = %admin.username, slug = %slug, "Contest session deleted");

    Ok(StatusCode::NO_CONTENT)
}
