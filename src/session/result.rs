use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::facts::Problem;
use crate::session::mode::InterventionMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    /// In progress when a timed session's deadline expired.
    Unanswered,
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub problem: Problem,
    pub outcome: Outcome,
    pub attempts: u32,
    pub elapsed_ms: u64,
}

impl ProblemRecord {
    pub fn was_correct(&self) -> bool {
        self.outcome == Outcome::Correct
    }
}

/// The persisted summary of one practice session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub mode: InterventionMode,
    pub records: Vec<ProblemRecord>,
    pub correct: usize,
    pub incorrect: usize,
    #[serde(default)]
    pub unanswered: usize,
    #[serde(default)]
    pub skipped: usize,
    pub digits_correct: usize,
    pub digits_correct_per_minute: f64,
    pub total_duration_ms: u64,
    #[serde(default)]
    pub expired: bool,
    pub completed_at: DateTime<Utc>,
}

impl SessionResult {
    pub fn attempted(&self) -> usize {
        self.correct + self.incorrect
    }

    pub fn accuracy(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            return 0.0;
        }
        self.correct as f64 / attempted as f64 * 100.0
    }
}

/// Collects per-problem outcomes in memory. It never persists anything; the
/// host hands `finalize`'s result to a `ResultSink`.
#[derive(Clone, Debug)]
pub struct SessionRecorder {
    mode: InterventionMode,
    records: Vec<ProblemRecord>,
}

impl SessionRecorder {
    pub fn new(mode: InterventionMode) -> Self {
        Self {
            mode,
            records: Vec::new(),
        }
    }

    pub fn record_outcome(
        &mut self,
        problem: Problem,
        outcome: Outcome,
        attempts: u32,
        elapsed_ms: u64,
    ) -> &ProblemRecord {
        self.records.push(ProblemRecord {
            problem,
            outcome,
            attempts,
            elapsed_ms,
        });
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[ProblemRecord] {
        &self.records
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }

    pub fn digits_correct(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.was_correct())
            .map(|r| r.problem.answer_digits())
            .sum()
    }

    pub fn finalize(&self, total_duration_ms: u64, expired: bool) -> SessionResult {
        let digits_correct = self.digits_correct();
        SessionResult {
            mode: self.mode,
            records: self.records.clone(),
            correct: self.count(Outcome::Correct),
            incorrect: self.count(Outcome::Incorrect),
            unanswered: self.count(Outcome::Unanswered),
            skipped: self.count(Outcome::Skipped),
            digits_correct,
            digits_correct_per_minute: digits_per_minute(digits_correct, total_duration_ms),
            total_duration_ms,
            expired,
            completed_at: Utc::now(),
        }
    }
}

/// `0.0` for a zero-length session instead of dividing by zero.
pub fn digits_per_minute(digits: usize, duration_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 0.0;
    }
    digits as f64 / (duration_ms as f64 / 60_000.0)
}
