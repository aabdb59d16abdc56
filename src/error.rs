use thiserror::Error;

/// A fact string that cannot become a `Problem`. These come from authored data,
/// so they surface loudly at load time instead of producing a corrupt problem.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("fact {0:?} has no operator")]
    MissingOperator(String),
    #[error("fact {0:?} is missing an operand")]
    MissingOperand(String),
    #[error("fact {0:?} has no '='")]
    MissingEquals(String),
    #[error("fact {0:?} has no answer")]
    MissingAnswer(String),
    #[error("fact {fact:?} contains a non-numeric part {part:?}")]
    InvalidNumber { fact: String, part: String },
    #[error("fact {0:?} divides by zero")]
    DivisionByZero(String),
    #[error("fact {fact:?} has answer {stated}, expected {expected}")]
    WrongAnswer {
        fact: String,
        stated: u32,
        expected: u32,
    },
    #[error("fact {0:?} has no non-negative whole-number answer")]
    NotWholeNumber(String),
    #[error("fact {0:?} does not fit the display frame")]
    TooWide(String),
}

/// Why a practice session could not begin.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StartError {
    #[error("no math problems have been added for this student")]
    NoProblemsAssigned,
}

/// Failures talking to the document store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("unknown student {0:?}")]
    UnknownStudent(String),
    #[error("stored fact bank is invalid: {0}")]
    InvalidFact(#[from] ProblemError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
