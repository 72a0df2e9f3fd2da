//! Contest definition documents
//!
//! One JSON document per contest, written by contest authors. Keys are
//! kebab-case.

use serde::{Deserialize, Serialize};

/// Full definition of one contest
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContestDefinition {
    pub name: String,
    /// Rendered contest page (opaque to this service)
    #[serde(default)]
    pub page: Option<String>,
    /// Contest length in seconds, counted from the session start
    pub duration: u64,
    /// Minimum seconds between two attempts of one user on one task
    #[serde(default)]
    pub submission_cooldown: u64,
    pub scoring: ScoringConfig,
    pub judge: JudgeSettings,
    pub tasks: Vec<TaskDefinition>,
}

impl ContestDefinition {
    /// Look up a task by its 1-based number
    pub fn task(&self, number: i32) -> Option<&TaskDefinition> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.tasks.get(index)
    }

    /// Look up a language by name
    pub fn language(&self, name: &str) -> Option<&Language> {
        self.judge.languages.iter().find(|l| l.name == name)
    }
}

/// Points awarded per accepted subtask, accepted test and correct answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScoringConfig {
    pub subtask_score: f64,
    pub test_score: f64,
    pub answer_score: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JudgeSettings {
    #[serde(default)]
    pub skip_count: u8,
    pub resource_limits: ResourceLimits,
    #[serde(alias = "language")]
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ResourceLimits {
    /// CPU time (seconds)
    pub cpu: u64,
    /// CPU time tolerance (seconds)
    pub cpu_tolerance: u64,
    /// Memory usage (bytes)
    pub memory: u64,
    /// Memory usage tolerance (bytes)
    pub memory_tolerance: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Language {
    pub name: String,
    pub file_extension: String,
    #[serde(default)]
    pub compile: Option<Vec<String>>,
    pub run: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskDefinition {
    pub name: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub page: Option<String>,
    /// Expected answer for free-form answer tasks; such tasks are never judged
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<SubtaskDefinition>,
}

impl TaskDefinition {
    pub fn is_answer_task(&self) -> bool {
        self.answer.is_some()
    }

    pub fn test_count(&self) -> usize {
        self.subtasks.iter().map(|s| s.tests.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubtaskDefinition {
    pub tests: Vec<TestDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestDefinition {
    pub input: String,
    pub output: String,
}
