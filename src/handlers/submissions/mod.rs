//! Submission handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Submission routes nested under a contest task
pub fn task_routes() -> Router<AppState> {
    Router::new().route(
        "/{slug}/tasks/{task}/submissions",
        get(handler::list_task_submissions).post(handler::create_submission),
    )
}

/// Submission routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/{id}", get(handler::get_submission))
}
