use tracing::debug;

use crate::facts::{FactBank, FactTransition, MasteryIntent, Problem};
use crate::session::result::{Outcome, ProblemRecord, SessionResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MasteryRule {
    /// Consecutive fluent sessions required.
    pub streak: usize,
    /// Slowest response that still counts as fluent.
    pub fluency_ms: u64,
}

impl MasteryRule {
    fn is_fluent(&self, record: &ProblemRecord) -> bool {
        record.outcome == Outcome::Correct
            && record.attempts == 1
            && record.elapsed_ms <= self.fluency_ms
    }
}

/// Facts still targeted whose last `streak` attempted presentations were all
/// fluent. `history` is oldest first; skipped and unanswered presentations do
/// not count either way.
pub fn mastered_facts(history: &[SessionResult], bank: &FactBank, rule: MasteryRule) -> Vec<MasteryIntent> {
    if rule.streak == 0 {
        return Vec::new();
    }
    bank.targeted()
        .iter()
        .filter(|problem| recent_streak_is_fluent(history, problem, rule))
        .map(|problem| {
            debug!(problem = %problem, "fact mastered");
            MasteryIntent::new(problem, FactTransition::ToMastered)
        })
        .collect()
}

fn recent_streak_is_fluent(history: &[SessionResult], problem: &Problem, rule: MasteryRule) -> bool {
    let attempted: Vec<&ProblemRecord> = history
        .iter()
        .rev()
        .flat_map(|session| session.records.iter().rev())
        .filter(|r| r.problem == *problem)
        .filter(|r| matches!(r.outcome, Outcome::Correct | Outcome::Incorrect))
        .take(rule.streak)
        .collect();
    attempted.len() == rule.streak && attempted.iter().all(|r| rule.is_fluent(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::mode::InterventionMode;
    use crate::session::result::SessionRecorder;

    const RULE: MasteryRule = MasteryRule {
        streak: 2,
        fluency_ms: 3_000,
    };

    fn problem(fact: &str) -> Problem {
        fact.parse().unwrap()
    }

    fn session(records: &[(&str, Outcome, u32, u64)]) -> SessionResult {
        let mut recorder = SessionRecorder::new(InterventionMode::CoverCopyCompare);
        for &(fact, outcome, attempts, ms) in records {
            recorder.record_outcome(problem(fact), outcome, attempts, ms);
        }
        recorder.finalize(60_000, false)
    }

    fn bank(facts: &[&str]) -> FactBank {
        let none: [&str; 0] = [];
        FactBank::from_fact_strings(facts, &none, &none).unwrap()
    }

    #[test]
    fn fluent_streak_masters_fact() {
        let history = vec![
            session(&[("2+2=4", Outcome::Correct, 1, 1_000)]),
            session(&[("2+2=4", Outcome::Correct, 1, 2_000)]),
        ];
        let intents = mastered_facts(&history, &bank(&["2+2=4", "3+3=6"]), RULE);
        assert_eq!(intents, vec![MasteryIntent {
            problem_id: "2+2=4".to_string(),
            transition: FactTransition::ToMastered,
        }]);
    }

    #[test]
    fn slow_or_retried_answers_break_streak() {
        let history = vec![
            session(&[("2+2=4", Outcome::Correct, 1, 1_000), ("3+3=6", Outcome::Correct, 2, 1_000)]),
            session(&[("2+2=4", Outcome::Correct, 1, 9_000), ("3+3=6", Outcome::Correct, 1, 1_000)]),
        ];
        assert!(mastered_facts(&history, &bank(&["2+2=4", "3+3=6"]), RULE).is_empty());
    }

    #[test]
    fn only_recent_sessions_count() {
        let history = vec![
            session(&[("2+2=4", Outcome::Incorrect, 1, 1_000)]),
            session(&[("2+2=4", Outcome::Correct, 1, 1_000)]),
            session(&[("2+2=4", Outcome::Skipped, 0, 10)]),
            session(&[("2+2=4", Outcome::Correct, 1, 1_000)]),
        ];
        assert_eq!(mastered_facts(&history, &bank(&["2+2=4"]), RULE).len(), 1);
    }

    #[test]
    fn too_few_sessions_is_not_mastery() {
        let history = vec![session(&[("2+2=4", Outcome::Correct, 1, 1_000)])];
        assert!(mastered_facts(&history, &bank(&["2+2=4"]), RULE).is_empty());
    }
}
