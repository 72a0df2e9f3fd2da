//! Admin contest management handlers

mod handler;
pub mod response;

pub use handler::*;
pub use response::*;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Admin routes
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/contests/{slug}/session",
        post(handler::start_contest).delete(handler::remove_contest_session),
    )
}
