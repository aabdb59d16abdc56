use std::time::Instant;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use factdrill::config::Config;
use factdrill::display::{compose, layout};
use factdrill::engine::mastery::mastered_facts;
use factdrill::facts::{FactBank, Operation};
use factdrill::generator::fact_set::standard_facts;
use factdrill::session::{
    EntryMode, InterventionMode, ModePolicy, SessionEvent, SessionMachine, SessionResult,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn full_bank() -> FactBank {
    FactBank::new(
        standard_facts(Operation::Multiplication, 12).unwrap(),
        Vec::new(),
        Vec::new(),
    )
}

fn run_session(bank: FactBank, mode: InterventionMode) -> SessionResult {
    let policy = ModePolicy::for_mode(mode, &Config::default());
    let mut rng = SmallRng::seed_from_u64(42);
    let t0 = Instant::now();
    let mut machine = SessionMachine::start(bank, policy, &mut rng, t0).unwrap();
    while !machine.is_complete() {
        let problem = machine.state().current_problem;
        let text = match policy.entry {
            EntryMode::ProblemEntry => problem.canonical(),
            EntryMode::AnswerEntry => problem.answer.to_string(),
        };
        for ch in text.chars() {
            machine.handle(SessionEvent::Input(ch), t0);
        }
        machine.handle(SessionEvent::Check, t0);
    }
    machine.result().unwrap().clone()
}

fn bench_session(c: &mut Criterion) {
    let bank = full_bank();

    c.bench_function("ccc session (169 facts)", |b| {
        b.iter(|| run_session(black_box(bank.clone()), InterventionMode::CoverCopyCompare))
    });

    c.bench_function("taped problems session (169 facts)", |b| {
        b.iter(|| run_session(black_box(bank.clone()), InterventionMode::TapedProblems))
    });
}

fn bench_layout(c: &mut Criterion) {
    let facts: Vec<String> = standard_facts(Operation::Division, 12)
        .unwrap()
        .iter()
        .map(|p| p.canonical())
        .collect();

    c.bench_function("layout (156 division facts)", |b| {
        b.iter(|| {
            for fact in &facts {
                black_box(layout(black_box(fact)));
            }
        })
    });

    let problem = "84/12=7".parse().unwrap();
    c.bench_function("compose partial entries", |b| {
        b.iter(|| {
            for entered in ["8", "84", "84/", "84/1", "84/12", "84/12=", "84/12=7"] {
                black_box(compose(&problem, black_box(entered), EntryMode::ProblemEntry));
            }
        })
    });
}

fn bench_mastery(c: &mut Criterion) {
    let bank = full_bank();
    let history: Vec<SessionResult> = (0..10)
        .map(|_| run_session(bank.clone(), InterventionMode::TapedProblems))
        .collect();
    let rule = Config::default().mastery_rule();

    c.bench_function("mastered_facts (10 sessions x 169 facts)", |b| {
        b.iter(|| mastered_facts(black_box(&history), black_box(&bank), rule))
    });
}

criterion_group!(benches, bench_session, bench_layout, bench_mastery);
criterion_main!(benches);
