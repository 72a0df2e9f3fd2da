//! Judge integration
//!
//! Protocol types, the event-stream decoder, the upstream HTTP client and the
//! relay that tees one judge stream to the caller and to result handling.

pub mod client;
pub mod decoder;
pub mod message;
pub mod relay;

pub use client::{JudgeClient, JudgeError, JudgeRequest};
pub use decoder::{DecodeError, EventDecoder};
pub use message::{Duration, JudgeMessage, Report, ResourceUsage, TestReport, Verdict};
pub use relay::{Interruption, PendingSubmission, RelayHandle, RunOutcome};
