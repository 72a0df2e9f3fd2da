//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    catalog::ContestCatalog, config::Config, judge::JudgeClient, services::ResultWriter,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Database connection pool
    pub db: PgPool,

    /// Client for the upstream judge
    pub judge: JudgeClient,

    /// Contest definitions, read-only after startup
    pub catalog: ContestCatalog,

    /// Sink for graded submissions
    pub writer: Arc<dyn ResultWriter>,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(
        db: PgPool,
        judge: JudgeClient,
        catalog: ContestCatalog,
        writer: Arc<dyn ResultWriter>,
        config: Config,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                db,
                judge,
                catalog,
                writer,
                config,
            }),
        }
    }

    /// Get a reference to the database pool
    pub fn db(&self) -> &PgPool {
        &self.inner.db
    }

    /// Get a reference to the judge client
    pub fn judge(&self) -> &JudgeClient {
        &self.inner.judge
    }

    /// Get a reference to the contest catalog
    pub fn catalog(&self) -> &ContestCatalog {
        &self.inner.catalog
    }

    /// Get a shared handle to the result writer
    pub fn writer(&self) -> Arc<dyn ResultWriter> {
        Arc::clone(&self.inner.writer)
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
