use std::time::Instant;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};

use factdrill::config::Config;
use factdrill::engine::benchmark::{is_benchmark_due, last_benchmark};
use factdrill::engine::mastery::mastered_facts;
use factdrill::error::{StartError, StoreError};
use factdrill::facts::{FactBank, MasteryIntent, Problem};
use factdrill::generator::fact_set::standard_facts;
use factdrill::session::{
    InterventionMode, ModePolicy, Phase, SessionEvent, SessionMachine, SessionResult, SessionSignal,
};
use factdrill::store::json_store::JsonStore;
use factdrill::store::{FactBankSupplier, MasterySink, ResultSink};

use crate::ui::components::menu::Menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Practice,
    Summary,
    /// The student has no targeted facts for the chosen operation.
    NoProblems,
}

/// Correction shown after a wrong attempt, until dismissed.
#[derive(Clone, Debug, PartialEq)]
pub struct Feedback {
    pub expected: Problem,
    pub entered: String,
    pub attempt: u32,
}

pub struct App {
    pub screen: AppScreen,
    pub mode: InterventionMode,
    pub session: Option<SessionMachine>,
    pub feedback: Option<Feedback>,
    pub last_result: Option<SessionResult>,
    pub persist_error: Option<String>,
    /// One-line status shown in the footer, e.g. a failed fact update.
    pub notice: Option<String>,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub store: Option<JsonStore>,
    pub should_quit: bool,
    rng: SmallRng,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = match JsonStore::new(&config.data_dir) {
            Ok(store) => Some(store),
            Err(err) => {
                warn!(data_dir = %config.data_dir, error = %err, "data dir unavailable, results will not be saved");
                None
            }
        };
        let theme = Theme::load(&config.theme).unwrap_or_default();
        Self::with_store(config, theme, store)
    }

    pub fn with_store(config: Config, theme: Theme, store: Option<JsonStore>) -> Self {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        let mut menu = Menu::new(theme);
        menu.select(config.mode);
        menu.subtitle = format!("{} | {}", config.student_id, config.target);

        let mut app = Self {
            screen: AppScreen::Menu,
            mode: config.mode,
            session: None,
            feedback: None,
            last_result: None,
            persist_error: None,
            notice: None,
            menu,
            theme,
            config,
            store,
            should_quit: false,
            rng: SmallRng::from_entropy(),
        };
        app.refresh_benchmark_due();
        app
    }

    fn load_bank(&self) -> Result<FactBank, StoreError> {
        let student = &self.config.student_id;
        let target = self.config.target;
        match self.store {
            Some(ref store) => {
                store.ensure_student(student, target, self.config.max_operand)?;
                store.load_fact_bank(student, target)
            }
            None => {
                let facts = standard_facts(target, self.config.max_operand)?;
                Ok(FactBank::new(facts, Vec::new(), Vec::new()))
            }
        }
    }

    pub fn start_session(&mut self, mode: InterventionMode) {
        self.start_session_at(mode, Instant::now());
    }

    pub fn start_session_at(&mut self, mode: InterventionMode, at: Instant) {
        self.mode = mode;
        self.feedback = None;
        self.persist_error = None;
        self.notice = None;

        let bank = match self.load_bank() {
            Ok(bank) => bank,
            Err(err) => {
                warn!(error = %err, "could not load fact bank");
                self.notice = Some(format!("Could not load facts: {err}"));
                self.screen = AppScreen::Menu;
                return;
            }
        };

        let policy = ModePolicy::for_mode(mode, &self.config);
        match SessionMachine::start(bank, policy, &mut self.rng, at) {
            Ok(machine) => {
                self.session = Some(machine);
                self.screen = AppScreen::Practice;
            }
            Err(err) => {
                info!(error = %err, "session not started");
                self.session = None;
                self.screen = match err {
                    StartError::NoProblemsAssigned => AppScreen::NoProblems,
                    _ => AppScreen::Menu,
                };
            }
        }
    }

    pub fn handle_session_event(&mut self, event: SessionEvent) {
        self.handle_session_event_at(event, Instant::now());
    }

    pub fn handle_session_event_at(&mut self, event: SessionEvent, at: Instant) {
        let Some(ref mut session) = self.session else {
            return;
        };
        let signals = session.handle(event, at);
        for signal in signals {
            self.apply_signal(signal);
        }
    }

    /// The space bar and the keypad's check key. What they do depends on
    /// where the learner is in the problem.
    pub fn confirm(&mut self) {
        self.confirm_at(Instant::now());
    }

    pub fn confirm_at(&mut self, at: Instant) {
        let Some(ref session) = self.session else {
            return;
        };
        let event = match session.phase() {
            Phase::Presenting if session.state().entry.is_empty() => SessionEvent::Reveal,
            Phase::Correcting => SessionEvent::Dismiss,
            _ => SessionEvent::Check,
        };
        self.handle_session_event_at(event, at);
    }

    /// Sends `Expire` once the deadline of a timed session has passed. Keys
    /// and clicks that arrive late expire the session the same way, inside
    /// the machine, before they are applied.
    pub fn tick(&mut self, now: Instant) {
        let expired = self
            .session
            .as_ref()
            .and_then(|s| s.deadline())
            .is_some_and(|deadline| now >= deadline);
        if expired {
            self.handle_session_event_at(SessionEvent::Expire, now);
        }
    }

    fn apply_signal(&mut self, signal: SessionSignal) {
        match signal {
            SessionSignal::Feedback {
                expected,
                entered,
                attempt,
            } => {
                self.feedback = Some(Feedback {
                    expected,
                    entered,
                    attempt,
                });
            }
            SessionSignal::PhaseChanged {
                from: Phase::Correcting,
                ..
            } => self.feedback = None,
            SessionSignal::Intent(intent) => self.emit_intent(&intent),
            SessionSignal::Completed(result) => self.finish_session(result),
            SessionSignal::PhaseChanged { .. } | SessionSignal::Rejected(_) | SessionSignal::Recorded(_) => {}
        }
    }

    fn emit_intent(&mut self, intent: &MasteryIntent) {
        let Some(ref store) = self.store else {
            return;
        };
        if let Err(err) = store.emit(&self.config.student_id, self.config.target, intent) {
            warn!(problem = %intent.problem_id, error = %err, "fact update failed");
            self.notice = Some(format!("Could not update {}: {err}", intent.problem_id));
        }
    }

    fn finish_session(&mut self, result: SessionResult) {
        self.session = None;
        self.feedback = None;
        self.last_result = Some(result);
        self.screen = AppScreen::Summary;
        self.persist_result();
    }

    fn persist_result(&mut self) {
        let (Some(store), Some(result)) = (self.store.as_ref(), self.last_result.as_ref()) else {
            return;
        };
        match store.persist(&self.config.student_id, self.config.target, result) {
            Ok(()) => {
                self.persist_error = None;
                self.apply_mastery();
                self.refresh_benchmark_due();
            }
            Err(err) => {
                warn!(error = %err, "session result not saved");
                self.persist_error = Some(err.to_string());
            }
        }
    }

    /// Tries the save again after a failure. The result is kept in memory
    /// until it is saved or the learner leaves the summary.
    pub fn retry_persist(&mut self) {
        if self.persist_error.is_some() {
            info!("retrying session save");
            self.persist_result();
        }
    }

    fn apply_mastery(&mut self) {
        let Some(ref store) = self.store else {
            return;
        };
        let student = &self.config.student_id;
        let target = self.config.target;
        let intents = store
            .history_for(student, target)
            .and_then(|history| Ok((history, store.load_fact_bank(student, target)?)))
            .map(|(history, bank)| mastered_facts(&history, &bank, self.config.mastery_rule()));
        match intents {
            Ok(intents) => {
                for intent in &intents {
                    self.emit_intent(intent);
                }
            }
            Err(err) => warn!(error = %err, "mastery check skipped"),
        }
    }

    pub fn refresh_benchmark_due(&mut self) {
        let due = match self.store {
            Some(ref store) => match store.history_for(&self.config.student_id, self.config.target) {
                Ok(history) => is_benchmark_due(
                    last_benchmark(&history),
                    Utc::now(),
                    self.config.benchmark_interval_days,
                ),
                Err(err) => {
                    warn!(error = %err, "could not read session history");
                    false
                }
            },
            None => false,
        };
        self.menu.benchmark_due = due;
    }

    /// Leaves a session in progress without recording anything.
    pub fn abandon(&mut self) {
        if let Some(session) = self.session.take() {
            session.abandon();
        }
        self.feedback = None;
        self.screen = AppScreen::Menu;
    }

    pub fn retry(&mut self) {
        self.start_session(self.mode);
    }

    pub fn go_to_menu(&mut self) {
        if self.persist_error.is_some() {
            warn!("leaving summary with unsaved result");
        }
        self.abandon();
        self.persist_error = None;
    }
}
