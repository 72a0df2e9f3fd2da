//! Scoring rules
//!
//! Scores depend only on how many verdicts in a report are `Accepted`, so a
//! persisted score can always be recomputed from the report alone.

use crate::{
    catalog::ScoringConfig,
    judge::{Report, Verdict},
};

/// Pure scoring functions
pub struct ScoringService;

impl ScoringService {
    /// Score a judged report
    pub fn score(report: &Report, config: &ScoringConfig) -> f64 {
        let accepted_subtasks = report.subtasks.iter().filter(|v| v.is_accepted()).count();
        let accepted_tests = report
            .tests
            .iter()
            .flatten()
            .filter(|t| t.verdict.is_accepted())
            .count();

        accepted_subtasks as f64 * config.subtask_score + accepted_tests as f64 * config.test_score
    }

    /// Grade a free-form answer against the expected one
    ///
    /// Only surrounding whitespace is ignored; case and inner whitespace count.
    pub fn score_answer(submitted: &str, expected: &str, config: &ScoringConfig) -> (f64, Verdict) {
        if submitted.trim() == expected.trim() {
            (config.answer_score, Verdict::Accepted)
        } else {
            (0.0, Verdict::WrongAnswer)
        }
    }
}
