//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod admission_repo;
pub mod contest_repo;
pub mod submission_repo;
pub mod user_repo;

pub use admission_repo::AdmissionRepository;
pub use contest_repo::ContestRepository;
pub use submission_repo::SubmissionRepository;
pub use user_repo::UserRepository;
