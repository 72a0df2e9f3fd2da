//! Arena - contest submission service
//!
//! Accepts contestant submissions, forwards code to an external judge and
//! relays the judge's live event stream back to the contestant, while a
//! second consumer of the same stream scores and stores the final report.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic (orchestration, scoring, leaderboard)
//! - **Judge**: Upstream protocol, event-stream decoding and the relay
//! - **Catalog**: Contest definitions loaded at startup
//! - **Repositories**: Database access
//! - **Models**: Domain models

pub mod catalog;
pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
