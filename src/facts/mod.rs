pub mod bank;
pub mod problem;

pub use bank::{FactBank, FactTransition, MasteryIntent, Operation};
pub use problem::{Operator, ParsedProblem, Problem, parse_problem_string};
