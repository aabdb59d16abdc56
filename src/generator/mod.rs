pub mod fact_set;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::facts::{FactBank, Problem};

/// One step of a problem sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Draw {
    Problem { position: usize, problem: Problem },
    EndOfSet,
}

/// Fixed presentation order over a bank's targeted facts.
///
/// The generator holds only the order; problems are read from the bank on each
/// `next` call, so the sequence is lazy and can be restarted at any time by
/// passing `None` as the previous position. It never wraps around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemGenerator {
    order: Vec<usize>,
}

impl ProblemGenerator {
    pub fn sequential(bank: &FactBank) -> Self {
        Self {
            order: (0..bank.targeted().len()).collect(),
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(bank: &FactBank, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..bank.targeted().len()).collect();
        order.shuffle(rng);
        Self { order }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn next(&self, bank: &FactBank, previous: Option<usize>) -> Draw {
        let start = previous.map_or(0, |p| p + 1);
        for position in start..self.order.len() {
            let Some(problem) = bank.targeted().get(self.order[position]) else {
                continue;
            };
            if bank.is_eligible(problem) {
                return Draw::Problem {
                    position,
                    problem: *problem,
                };
            }
        }
        Draw::EndOfSet
    }

    /// Walks the whole sequence from the start.
    pub fn iter<'a>(&'a self, bank: &'a FactBank) -> impl Iterator<Item = Problem> + 'a {
        let mut previous = None;
        std::iter::from_fn(move || match self.next(bank, previous) {
            Draw::Problem { position, problem } => {
                previous = Some(position);
                Some(problem)
            }
            Draw::EndOfSet => None,
        })
    }
}
