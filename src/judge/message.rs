//! Judge protocol messages
//!
//! These types mirror the JSON objects the judge emits in the `data:` field of
//! each event-stream frame. Every object carries a `type` tag naming the variant.

use serde::{Deserialize, Serialize};

/// A single event emitted by the judge for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum JudgeMessage {
    /// Submission accepted by the judge, with the total number of tests
    Queued { tests: u32 },
    /// Compilation started
    Compiling,
    /// Compilation finished
    Compiled { exit_code: i32, stderr: String },
    /// A test finished with the given verdict
    Judging { verdict: Verdict },
    /// Remaining tests are being skipped
    Skipping { estimated_count: u32 },
    /// Judging completed
    Done { report: Report },
    /// Judging aborted
    Error { reason: String },
}

impl JudgeMessage {
    /// Whether this message ends the stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }

    /// Tag name, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Queued { .. } => "Queued",
            Self::Compiling => "Compiling",
            Self::Compiled { .. } => "Compiled",
            Self::Judging { .. } => "Judging",
            Self::Skipping { .. } => "Skipping",
            Self::Done { .. } => "Done",
            Self::Error { .. } => "Error",
        }
    }
}

/// Judging verdict for a test, a subtask or a whole task
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    CompileError,
    RuntimeError,
    MemoryLimitExceeded,
    TimeLimitExceeded,
    WrongAnswer,
    Skipped,
    Accepted,
}

impl Verdict {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompileError => "compile_error",
            Self::RuntimeError => "runtime_error",
            Self::MemoryLimitExceeded => "memory_limit_exceeded",
            Self::TimeLimitExceeded => "time_limit_exceeded",
            Self::WrongAnswer => "wrong_answer",
            Self::Skipped => "skipped",
            Self::Accepted => "accepted",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verdict {
    type Err = UnknownVerdict;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compile_error" => Ok(Self::CompileError),
            "runtime_error" => Ok(Self::RuntimeError),
            "memory_limit_exceeded" => Ok(Self::MemoryLimitExceeded),
            "time_limit_exceeded" => Ok(Self::TimeLimitExceeded),
            "wrong_answer" => Ok(Self::WrongAnswer),
            "skipped" => Ok(Self::Skipped),
            "accepted" => Ok(Self::Accepted),
            other => Err(UnknownVerdict(other.to_string())),
        }
    }
}

/// Stored verdict text that does not name a known verdict
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown verdict: {0}")]
pub struct UnknownVerdict(pub String);

/// Elapsed time as reported by the judge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub secs: u64,
    pub nanos: u32,
}

impl Duration {
    pub fn as_millis_f64(&self) -> f64 {
        self.secs as f64 * 1000.0 + self.nanos as f64 / 1e6
    }
}

/// Resources consumed by one test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceUsage {
    /// Peak memory (bytes)
    pub memory: u64,
    #[serde(rename = "user-time")]
    pub user_time: Duration,
    #[serde(rename = "sys-time")]
    pub sys_time: Duration,
}

impl ResourceUsage {
    /// Combined user and system CPU time in milliseconds
    pub fn runtime_millis(&self) -> f64 {
        self.user_time.as_millis_f64() + self.sys_time.as_millis_f64()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub verdict: Verdict,
    pub resource_usage: ResourceUsage,
}

/// Final judging report carried by `Done`
///
/// `tests[i]` holds the tests of subtask `i`, so `subtasks` and `tests` always
/// have the same length once the report has passed [`Report::check`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub task: Verdict,
    pub subtasks: Vec<Verdict>,
    pub tests: Vec<Vec<TestReport>>,
}

impl Report {
    /// Verify the subtask/test shape invariant
    pub fn check(&self) -> Result<(), (usize, usize)> {
        if self.subtasks.len() == self.tests.len() {
            Ok(())
        } else {
            Err((self.subtasks.len(), self.tests.len()))
        }
    }

    /// Total number of tests across all subtasks
    pub fn test_count(&self) -> usize {
        self.tests.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_done_message() {
        let json = r#"{
            "type": "Done",
            "report": {
                "task": "WrongAnswer",
                "subtasks": ["Accepted", "WrongAnswer"],
                "tests": [
                    [{"verdict": "Accepted", "resource_usage": {"memory": 1024, "user-time": {"secs": 0, "nanos": 5000000}, "sys-time": {"secs": 1, "nanos": 0}}}],
                    [{"verdict": "WrongAnswer", "resource_usage": {"memory": 2048, "user-time": {"secs": 0, "nanos": 0}, "sys-time": {"secs": 0, "nanos": 0}}}]
                ]
            }
        }"#;

        let message: JudgeMessage = serde_json::from_str(json).unwrap();
        let JudgeMessage::Done { report } = message else {
            panic!("expected Done");
        };
        assert_eq!(report.task, Verdict::WrongAnswer);
        assert_eq!(report.test_count(), 2);
        assert_eq!(report.tests[0][0].resource_usage.runtime_millis(), 1005.0);
        assert!(report.check().is_ok());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = serde_json::from_str::<JudgeMessage>(r#"{"type":"Paused"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_extra_fields_are_tolerated() {
        let message: JudgeMessage =
            serde_json::from_str(r#"{"type":"Queued","tests":12,"uuid":"abc"}"#).unwrap();
        assert_eq!(message, JudgeMessage::Queued { tests: 12 });
    }

    #[test]
    fn test_verdict_storage_round_trip() {
        for verdict in [Verdict::CompileError, Verdict::Skipped, Verdict::Accepted] {
            assert_eq!(verdict.as_str().parse::<Verdict>().unwrap(), verdict);
        }
        assert!("pending".parse::<Verdict>().is_err());
    }

    #[test]
    fn test_terminal_messages() {
        assert!(JudgeMessage::Error { reason: "boom".into() }.is_terminal());
        assert!(!JudgeMessage::Compiling.is_terminal());
    }
}
