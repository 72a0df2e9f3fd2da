//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod admin;
pub mod contests;
pub mod health;
pub mod submissions;

use axum::{Router, extract::DefaultBodyLimit, middleware};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    constants::{API_BASE_PATH, MULTIPART_OVERHEAD_BYTES},
    middleware::{auth::auth_middleware, logging::logging_middleware},
    state::AppState,
};

/// Create all API routes
pub fn routes(state: AppState) -> Router<AppState> {
    let auth = middleware::from_fn_with_state(state, auth_middleware);

    Router::new()
        .nest(
            "/contests",
            contests::routes().merge(submissions::task_routes().route_layer(auth.clone())),
        )
        .nest("/submissions", submissions::routes().route_layer(auth.clone()))
        .nest("/admin", admin::routes().route_layer(auth))
}

/// Build the complete application
pub fn app(state: AppState) -> Router {
    let body_limit = state.config().catalog.max_code_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .merge(health::routes())
        .nest(API_BASE_PATH, routes(state.clone()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
