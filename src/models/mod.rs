//! Domain models
//!
//! Database rows and the value types derived from them.

pub mod contest;
pub mod leaderboard;
pub mod submission;

pub use contest::*;
pub use leaderboard::*;
pub use submission::*;
