use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProblemError;
use crate::facts::problem::{Operator, Problem};

/// The operation a student is practicing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        }
    }

    pub fn operator(self) -> Operator {
        match self {
            Operation::Addition => Operator::Add,
            Operation::Subtraction => Operator::Subtract,
            Operation::Multiplication => Operator::Multiply,
            Operation::Division => Operator::Divide,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "addition" | "add" | "+" => Ok(Operation::Addition),
            "subtraction" | "subtract" | "-" => Ok(Operation::Subtraction),
            "multiplication" | "multiply" | "x" => Ok(Operation::Multiplication),
            "division" | "divide" | "/" => Ok(Operation::Division),
            other => Err(format!("unknown operation {other:?}")),
        }
    }
}

/// Candidate problems for one student and target, in stored order.
///
/// The three partitions are kept disjoint: a fact listed as mastered or
/// skipped is dropped from `targeted` on construction, so nothing reading the
/// bank can ever present it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactBank {
    targeted: Vec<Problem>,
    mastered: Vec<Problem>,
    skipped: Vec<Problem>,
}

impl FactBank {
    pub fn new(targeted: Vec<Problem>, mastered: Vec<Problem>, skipped: Vec<Problem>) -> Self {
        let mut seen = Vec::with_capacity(targeted.len());
        let targeted = targeted
            .into_iter()
            .filter(|p| !mastered.contains(p) && !skipped.contains(p))
            .filter(|p| {
                if seen.contains(p) {
                    false
                } else {
                    seen.push(*p);
                    true
                }
            })
            .collect();
        let skipped = skipped
            .into_iter()
            .filter(|p| !mastered.contains(p))
            .collect();
        Self {
            targeted,
            mastered,
            skipped,
        }
    }

    /// Builds a bank from stored fact strings, failing on the first malformed one.
    pub fn from_fact_strings<S: AsRef<str>>(
        targeted: &[S],
        mastered: &[S],
        skipped: &[S],
    ) -> Result<Self, ProblemError> {
        fn parse_all<S: AsRef<str>>(facts: &[S]) -> Result<Vec<Problem>, ProblemError> {
            facts.iter().map(|f| f.as_ref().parse()).collect()
        }
        Ok(Self::new(
            parse_all(targeted)?,
            parse_all(mastered)?,
            parse_all(skipped)?,
        ))
    }

    pub fn targeted(&self) -> &[Problem] {
        &self.targeted
    }

    pub fn mastered(&self) -> &[Problem] {
        &self.mastered
    }

    pub fn skipped(&self) -> &[Problem] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.targeted.is_empty()
    }

    /// Whether `problem` may be presented.
    pub fn is_eligible(&self, problem: &Problem) -> bool {
        !self.mastered.contains(problem) && !self.skipped.contains(problem)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactTransition {
    ToMastered,
    ToSkipped,
}

/// A request for the student record to move a fact out of `targeted`.
/// The core only emits these; the store applies them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryIntent {
    pub problem_id: String,
    pub transition: FactTransition,
}

impl MasteryIntent {
    pub fn new(problem: &Problem, transition: FactTransition) -> Self {
        Self {
            problem_id: problem.canonical(),
            transition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_are_disjoint() {
        let bank = FactBank::from_fact_strings(
            &["1+1=2", "2+2=4", "3+3=6", "2+2=4"],
            &["2+2=4"],
            &["3+3=6"],
        )
        .unwrap();
        let targeted: Vec<String> = bank.targeted().iter().map(|p| p.canonical()).collect();
        assert_eq!(targeted, vec!["1+1=2"]);
        assert_eq!(bank.mastered().len(), 1);
        assert_eq!(bank.skipped().len(), 1);
    }

    #[test]
    fn mastered_wins_over_skipped() {
        let bank = FactBank::from_fact_strings(&["1+1=2"], &["5x5=25"], &["5x5=25"]).unwrap();
        assert!(bank.skipped().is_empty());
    }

    #[test]
    fn malformed_fact_rejects_bank() {
        let empty: [&str; 0] = [];
        assert!(FactBank::from_fact_strings(&["1+1"], &empty, &empty).is_err());
    }

    #[test]
    fn operation_parses_aliases() {
        assert_eq!("Multiply".parse::<Operation>(), Ok(Operation::Multiplication));
        assert_eq!("/".parse::<Operation>(), Ok(Operation::Division));
        assert!("modulo".parse::<Operation>().is_err());
    }
}
