//! Business logic services

pub mod contest_service;
pub mod leaderboard_service;
pub mod result_writer;
pub mod scoring_service;
pub mod submission_service;

pub use contest_service::ContestService;
pub use leaderboard_service::LeaderboardService;
pub use result_writer::{PgResultWriter, ResultWriter};
pub use scoring_service::ScoringService;
pub use submission_service::SubmissionService;
