use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::StartError;
use crate::facts::{FactBank, FactTransition, MasteryIntent, Problem};
use crate::generator::{Draw, ProblemGenerator};
use crate::session::entry::{EntryBuffer, EntryMode, Rejected};
use crate::session::mode::ModePolicy;
use crate::session::result::{Outcome, ProblemRecord, SessionRecorder, SessionResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Presenting,
    Accepting,
    Validating,
    Correcting,
    Advancing,
    Complete,
}

/// Input to the machine. Keyboard keys and on-screen keypad clicks map onto
/// the same variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A digit, operator or `=`.
    Input(char),
    Backspace,
    Clear,
    /// Submit the buffer for validation.
    Check,
    /// Start copying from `Presenting` without typing a character.
    Reveal,
    /// Close correction feedback and try again.
    Dismiss,
    /// Drop the current fact from practice.
    Skip,
    /// The session deadline passed.
    Expire,
}

/// What a transition produced, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionSignal {
    PhaseChanged { from: Phase, to: Phase },
    Rejected(Rejected),
    Feedback {
        expected: Problem,
        entered: String,
        attempt: u32,
    },
    Recorded(ProblemRecord),
    Intent(MasteryIntent),
    Completed(SessionResult),
}

#[derive(Clone, Debug)]
pub struct SessionState {
    /// Position of the current problem in the generator's order.
    pub current_problem_index: usize,
    pub current_problem: Problem,
    pub entry: EntryBuffer,
    pub is_covered: bool,
    pub phase: Phase,
    /// The attempt the learner is on, starting at 1.
    pub attempts_on_current_problem: u32,
    pub started_at: Instant,
    pub problem_started_at: Instant,
}

impl SessionState {
    fn submitted_attempts(&self) -> u32 {
        self.attempts_on_current_problem.saturating_sub(1)
    }
}

/// Drives one practice session. Every call to `handle` runs a complete
/// transition before returning; deadlines are owned by the host and arrive as
/// `SessionEvent::Expire`.
pub struct SessionMachine {
    policy: ModePolicy,
    bank: FactBank,
    generator: ProblemGenerator,
    recorder: SessionRecorder,
    state: SessionState,
    result: Option<SessionResult>,
}

impl SessionMachine {
    pub fn start<R: Rng + ?Sized>(
        bank: FactBank,
        policy: ModePolicy,
        rng: &mut R,
        at: Instant,
    ) -> Result<Self, StartError> {
        let generator = if policy.shuffle {
            ProblemGenerator::shuffled(&bank, rng)
        } else {
            ProblemGenerator::sequential(&bank)
        };
        Self::start_with_generator(bank, policy, generator, at)
    }

    pub fn start_with_generator(
        bank: FactBank,
        policy: ModePolicy,
        generator: ProblemGenerator,
        at: Instant,
    ) -> Result<Self, StartError> {
        let Draw::Problem { position, problem } = generator.next(&bank, None) else {
            warn!(mode = %policy.mode, "no targeted facts, session not started");
            return Err(StartError::NoProblemsAssigned);
        };

        info!(mode = %policy.mode, problems = generator.len(), "session started");
        let state = SessionState {
            current_problem_index: position,
            current_problem: problem,
            entry: EntryBuffer::for_problem(&problem, policy.entry),
            is_covered: false,
            phase: Phase::Presenting,
            attempts_on_current_problem: 1,
            started_at: at,
            problem_started_at: at,
        };

        Ok(Self {
            recorder: SessionRecorder::new(policy.mode),
            policy,
            bank,
            generator,
            state,
            result: None,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn policy(&self) -> &ModePolicy {
        &self.policy
    }

    pub fn records(&self) -> &[ProblemRecord] {
        self.recorder.records()
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase == Phase::Complete
    }

    /// Problems in this session's sequence.
    pub fn total_problems(&self) -> usize {
        self.generator.len()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.policy.deadline.map(|d| self.state.started_at + d)
    }

    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn handle(&mut self, event: SessionEvent, at: Instant) -> Vec<SessionSignal> {
        let mut signals = Vec::new();
        let phase = self.state.phase;

        // Anything arriving after the deadline expires the session at the
        // deadline itself and is otherwise dropped.
        if phase != Phase::Complete
            && let Some(deadline) = self.deadline()
            && at >= deadline
        {
            debug!(?event, "event past deadline");
            self.expire(deadline, &mut signals);
            return signals;
        }

        match (event, phase) {
            (_, Phase::Complete | Phase::Validating | Phase::Advancing) => {
                debug!(?event, ?phase, "event ignored");
            }
            (SessionEvent::Expire, _) => self.expire(at, &mut signals),
            (SessionEvent::Input('='), Phase::Presenting | Phase::Accepting)
                if self.policy.entry == EntryMode::AnswerEntry =>
            {
                self.check(at, &mut signals);
            }
            (SessionEvent::Input(ch), Phase::Presenting | Phase::Accepting) => {
                if phase == Phase::Presenting {
                    self.begin_accepting(&mut signals);
                }
                if let Err(rejected) = self.state.entry.append(ch) {
                    debug!(?rejected, "input rejected");
                    signals.push(SessionSignal::Rejected(rejected));
                }
            }
            (SessionEvent::Backspace, Phase::Accepting) => {
                self.state.entry.backspace();
            }
            (SessionEvent::Clear, Phase::Accepting) => {
                self.state.entry.clear();
            }
            (SessionEvent::Reveal, Phase::Presenting) => self.begin_accepting(&mut signals),
            (SessionEvent::Check, Phase::Presenting | Phase::Accepting) => {
                self.check(at, &mut signals);
            }
            (SessionEvent::Dismiss, Phase::Correcting) => {
                self.state.entry.clear();
                self.state.is_covered = self.policy.covers;
                self.transition(Phase::Accepting, &mut signals);
            }
            (SessionEvent::Skip, Phase::Presenting | Phase::Accepting | Phase::Correcting) => {
                let problem = self.state.current_problem;
                self.record(Outcome::Skipped, self.state.submitted_attempts(), at, &mut signals);
                signals.push(SessionSignal::Intent(MasteryIntent::new(
                    &problem,
                    FactTransition::ToSkipped,
                )));
                self.advance(at, &mut signals);
            }
            _ => debug!(?event, ?phase, "event not valid in phase"),
        }

        signals
    }

    /// Ends the session without a result. Nothing is persisted.
    pub fn abandon(self) {
        info!(
            mode = %self.policy.mode,
            recorded = self.recorder.records().len(),
            "session abandoned"
        );
    }

    fn transition(&mut self, to: Phase, signals: &mut Vec<SessionSignal>) {
        let from = self.state.phase;
        if from == to {
            return;
        }
        debug!(?from, ?to, "phase");
        self.state.phase = to;
        signals.push(SessionSignal::PhaseChanged { from, to });
    }

    fn begin_accepting(&mut self, signals: &mut Vec<SessionSignal>) {
        self.state.is_covered = self.policy.covers;
        self.transition(Phase::Accepting, signals);
    }

    fn check(&mut self, at: Instant, signals: &mut Vec<SessionSignal>) {
        if self.state.entry.is_empty() {
            return;
        }
        self.transition(Phase::Validating, signals);

        let problem = self.state.current_problem;
        let attempt = self.state.attempts_on_current_problem;
        if self.state.entry.matches(&problem) {
            self.record(Outcome::Correct, attempt, at, signals);
            self.advance(at, signals);
        } else if attempt < self.policy.max_attempts {
            let entered = self.state.entry.as_str().to_string();
            self.state.attempts_on_current_problem += 1;
            self.state.entry.clear();
            self.state.is_covered = false;
            self.transition(Phase::Correcting, signals);
            signals.push(SessionSignal::Feedback {
                expected: problem,
                entered,
                attempt,
            });
        } else {
            self.record(Outcome::Incorrect, attempt, at, signals);
            self.advance(at, signals);
        }
    }

    fn record(&mut self, outcome: Outcome, attempts: u32, at: Instant, signals: &mut Vec<SessionSignal>) {
        let elapsed_ms = at
            .saturating_duration_since(self.state.problem_started_at)
            .as_millis() as u64;
        let record = self
            .recorder
            .record_outcome(self.state.current_problem, outcome, attempts, elapsed_ms)
            .clone();
        debug!(problem = %record.problem, ?outcome, attempts, elapsed_ms, "recorded");
        signals.push(SessionSignal::Recorded(record));
    }

    fn advance(&mut self, at: Instant, signals: &mut Vec<SessionSignal>) {
        self.transition(Phase::Advancing, signals);
        self.state.entry.clear();

        match self
            .generator
            .next(&self.bank, Some(self.state.current_problem_index))
        {
            Draw::Problem { position, problem } => {
                self.state.current_problem_index = position;
                self.state.current_problem = problem;
                self.state.entry = EntryBuffer::for_problem(&problem, self.policy.entry);
                self.state.attempts_on_current_problem = 1;
                self.state.is_covered = false;
                self.state.problem_started_at = at;
                self.transition(Phase::Presenting, signals);
            }
            Draw::EndOfSet => self.complete(at, false, signals),
        }
    }

    fn expire(&mut self, at: Instant, signals: &mut Vec<SessionSignal>) {
        info!(mode = %self.policy.mode, "deadline expired");
        self.record(Outcome::Unanswered, self.state.submitted_attempts(), at, signals);
        self.state.entry.clear();
        self.complete(at, true, signals);
    }

    fn complete(&mut self, at: Instant, expired: bool, signals: &mut Vec<SessionSignal>) {
        self.transition(Phase::Complete, signals);
        self.state.is_covered = false;
        let total_ms = at.saturating_duration_since(self.state.started_at).as_millis() as u64;
        let result = self.recorder.finalize(total_ms, expired);
        info!(
            mode = %self.policy.mode,
            correct = result.correct,
            incorrect = result.incorrect,
            dcpm = result.digits_correct_per_minute,
            "session complete"
        );
        signals.push(SessionSignal::Completed(result.clone()));
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::mode::InterventionMode;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn bank(facts: &[&str]) -> FactBank {
        let none: [&str; 0] = [];
        FactBank::from_fact_strings(facts, &none, &none).unwrap()
    }

    fn machine(mode: InterventionMode, facts: &[&str], t0: Instant) -> SessionMachine {
        let mut config = Config::default();
        config.randomize = false;
        let mut policy = ModePolicy::for_mode(mode, &config);
        policy.shuffle = false;
        let mut rng = SmallRng::seed_from_u64(1);
        SessionMachine::start(bank(facts), policy, &mut rng, t0).unwrap()
    }

    fn type_str(m: &mut SessionMachine, text: &str, at: Instant) {
        for ch in text.chars() {
            m.handle(SessionEvent::Input(ch), at);
        }
    }

    #[test]
    fn starts_presenting_uncovered() {
        let t0 = Instant::now();
        let m = machine(InterventionMode::CoverCopyCompare, &["1+1=2"], t0);
        assert_eq!(m.phase(), Phase::Presenting);
        assert!(!m.state().is_covered);
        assert!(m.state().entry.is_empty());
    }

    #[test]
    fn first_keystroke_covers_in_ccc() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["1+1=2"], t0);
        let signals = m.handle(SessionEvent::Input('1'), t0);
        assert_eq!(m.phase(), Phase::Accepting);
        assert!(m.state().is_covered);
        assert_eq!(
            signals[0],
            SessionSignal::PhaseChanged {
                from: Phase::Presenting,
                to: Phase::Accepting
            }
        );
    }

    #[test]
    fn reveal_starts_accepting_without_input() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["1+1=2"], t0);
        m.handle(SessionEvent::Reveal, t0);
        assert_eq!(m.phase(), Phase::Accepting);
        assert!(m.state().entry.is_empty());
    }

    #[test]
    fn no_validation_per_keystroke() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["1+1=2"], t0);
        type_str(&mut m, "1+1=2", t0);
        assert_eq!(m.phase(), Phase::Accepting);
        assert!(m.records().is_empty());
    }

    #[test]
    fn incorrect_then_dismiss_recovers_same_problem() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["2+3=5", "1+1=2"], t0);
        type_str(&mut m, "2+3=6", t0);
        let signals = m.handle(SessionEvent::Check, t0);
        assert_eq!(m.phase(), Phase::Correcting);
        assert!(!m.state().is_covered);
        assert!(m.state().entry.is_empty());
        assert!(signals.iter().any(|s| matches!(
            s,
            SessionSignal::Feedback { entered, attempt: 1, .. } if entered == "2+3=6"
        )));

        // typing is ignored until feedback is dismissed
        m.handle(SessionEvent::Input('2'), t0);
        assert!(m.state().entry.is_empty());

        m.handle(SessionEvent::Dismiss, t0);
        assert_eq!(m.phase(), Phase::Accepting);
        assert!(m.state().is_covered);
        assert_eq!(m.state().current_problem.canonical(), "2+3=5");
        assert_eq!(m.state().attempts_on_current_problem, 2);
    }

    #[test]
    fn retry_ceiling_records_incorrect_and_advances() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["2+3=5", "1+1=2"], t0);
        for _ in 0..2 {
            type_str(&mut m, "2+3=4", t0);
            m.handle(SessionEvent::Check, t0);
            assert_eq!(m.phase(), Phase::Correcting);
            m.handle(SessionEvent::Dismiss, t0);
        }
        type_str(&mut m, "2+3=4", t0);
        m.handle(SessionEvent::Check, t0);
        assert_eq!(m.phase(), Phase::Presenting);
        assert_eq!(m.records().len(), 1);
        assert_eq!(m.records()[0].outcome, Outcome::Incorrect);
        assert_eq!(m.records()[0].attempts, 3);
        assert_eq!(m.state().current_problem.canonical(), "1+1=2");
    }

    #[test]
    fn timed_mode_moves_on_after_one_wrong_answer() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::ExplicitTiming, &["6x7=42", "3x3=9"], t0);
        type_str(&mut m, "41", t0);
        m.handle(SessionEvent::Check, t0);
        assert_eq!(m.phase(), Phase::Presenting);
        assert_eq!(m.records()[0].outcome, Outcome::Incorrect);
        assert_eq!(m.records()[0].attempts, 1);
    }

    #[test]
    fn equals_key_checks_in_answer_entry() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::TapedProblems, &["6x7=42"], t0);
        type_str(&mut m, "42=", t0 + Duration::from_secs(3));
        assert!(m.is_complete());
        assert_eq!(m.records()[0].elapsed_ms, 3_000);
    }

    #[test]
    fn check_on_empty_buffer_is_ignored() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["1+1=2"], t0);
        let signals = m.handle(SessionEvent::Check, t0);
        assert!(signals.is_empty());
        assert_eq!(m.phase(), Phase::Presenting);
    }

    #[test]
    fn double_check_records_once() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["1+1=2", "2+2=4"], t0);
        type_str(&mut m, "1+1=2", t0);
        m.handle(SessionEvent::Check, t0);
        m.handle(SessionEvent::Check, t0);
        assert_eq!(m.records().len(), 1);
        assert_eq!(m.phase(), Phase::Presenting);
    }

    #[test]
    fn expire_marks_in_progress_unanswered() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::ExplicitTiming, &["6x7=42", "3x3=9"], t0);
        type_str(&mut m, "42", t0);
        m.handle(SessionEvent::Check, t0);
        type_str(&mut m, "8", t0);
        let later = t0 + Duration::from_secs(120);
        let signals = m.handle(SessionEvent::Expire, later);
        assert!(m.is_complete());
        let result = m.result().unwrap();
        assert!(result.expired);
        assert_eq!(result.correct, 1);
        assert_eq!(result.incorrect, 0);
        assert_eq!(result.unanswered, 1);
        assert_eq!(result.total_duration_ms, 120_000);
        assert!(matches!(signals.last(), Some(SessionSignal::Completed(_))));
    }

    #[test]
    fn late_check_expires_instead_of_scoring() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::ExplicitTiming, &["6x7=42", "3x3=9"], t0);
        type_str(&mut m, "42", t0 + Duration::from_secs(5));
        let signals = m.handle(SessionEvent::Check, t0 + Duration::from_secs(125));

        assert!(m.is_complete());
        assert!(!signals.iter().any(|s| matches!(
            s,
            SessionSignal::Recorded(r) if r.outcome == Outcome::Correct
        )));
        let result = m.result().unwrap();
        assert!(result.expired);
        assert_eq!(result.correct, 0);
        assert_eq!(result.unanswered, 1);
        assert_eq!(result.total_duration_ms, 120_000);
        assert_eq!(result.records[0].elapsed_ms, 120_000);
    }

    #[test]
    fn untimed_sessions_have_no_deadline() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::TapedProblems, &["1+1=2"], t0);
        type_str(&mut m, "2", t0 + Duration::from_secs(3_600));
        m.handle(SessionEvent::Check, t0 + Duration::from_secs(3_600));
        assert_eq!(m.result().unwrap().correct, 1);
    }

    #[test]
    fn events_after_complete_are_ignored() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::TapedProblems, &["1+1=2"], t0);
        type_str(&mut m, "2", t0);
        m.handle(SessionEvent::Check, t0);
        assert!(m.is_complete());
        assert!(m.handle(SessionEvent::Expire, t0).is_empty());
        assert!(m.handle(SessionEvent::Input('1'), t0).is_empty());
        assert_eq!(m.records().len(), 1);
    }

    #[test]
    fn skip_emits_intent_and_advances() {
        let t0 = Instant::now();
        let mut m = machine(InterventionMode::CoverCopyCompare, &["9x9=81", "1x1=1"], t0);
        let signals = m.handle(SessionEvent::Skip, t0);
        assert!(signals.iter().any(|s| matches!(
            s,
            SessionSignal::Intent(MasteryIntent { problem_id, transition: FactTransition::ToSkipped })
                if problem_id == "9x9=81"
        )));
        assert_eq!(m.records()[0].outcome, Outcome::Skipped);
        assert_eq!(m.records()[0].attempts, 0);
        assert_eq!(m.state().current_problem.canonical(), "1x1=1");
    }

    #[test]
    fn deadline_is_relative_to_start() {
        let t0 = Instant::now();
        let m = machine(InterventionMode::Benchmark, &["1+1=2"], t0);
        assert_eq!(m.deadline(), Some(t0 + Duration::from_secs(120)));
        assert_eq!(
            m.time_remaining(t0 + Duration::from_secs(20)),
            Some(Duration::from_secs(100))
        );
        let untimed = machine(InterventionMode::CoverCopyCompare, &["1+1=2"], t0);
        assert_eq!(untimed.deadline(), None);
    }
}
