use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProblemError;

/// Widest operand A / answer the display frame can hold.
pub const MAX_WIDE_DIGITS: usize = 3;
/// Operand B shares its row with the operator glyph.
pub const MAX_OPERAND_B_DIGITS: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Accepts the canonical symbols plus the common keyboard and display
    /// spellings (`*`, `X`, `×`, `÷`, `−`).
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Operator::Add),
            '-' | '\u{2212}' => Some(Operator::Subtract),
            'x' | 'X' | '*' | '\u{00d7}' => Some(Operator::Multiply),
            '/' | '\u{00f7}' => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Stored and compared form.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => 'x',
            Operator::Divide => '/',
        }
    }

    /// Rendered form. Never used for comparison.
    pub fn glyph(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '\u{00d7}',
            Operator::Divide => '\u{00f7}',
        }
    }

    /// `None` when the result is not a non-negative whole number.
    pub fn apply(self, a: u32, b: u32) -> Option<u32> {
        match self {
            Operator::Add => a.checked_add(b),
            Operator::Subtract => a.checked_sub(b),
            Operator::Multiply => a.checked_mul(b),
            Operator::Divide => {
                if b == 0 || a % b != 0 {
                    None
                } else {
                    Some(a / b)
                }
            }
        }
    }
}

/// A (possibly partial) problem string split into its parts.
///
/// This is the one parser for `a{op}b=c` text: entry validation and the
/// display frame both go through it so they can never disagree about where
/// the operator or the answer starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParsedProblem<'a> {
    pub left: &'a str,
    pub operator: Option<Operator>,
    pub right: &'a str,
    pub has_equals: bool,
    pub answer: &'a str,
}

impl ParsedProblem<'_> {
    pub fn is_complete(&self) -> bool {
        self.operator.is_some()
            && !self.left.is_empty()
            && !self.right.is_empty()
            && self.has_equals
            && !self.answer.is_empty()
    }
}

pub fn parse_problem_string(text: &str) -> ParsedProblem<'_> {
    let (head, answer, has_equals) = match text.find('=') {
        Some(eq) => (&text[..eq], &text[eq + 1..], true),
        None => (text, "", false),
    };

    let op_pos = head
        .char_indices()
        .find_map(|(i, ch)| Operator::from_char(ch).map(|op| (i, ch.len_utf8(), op)));

    match op_pos {
        Some((i, width, op)) => ParsedProblem {
            left: &head[..i],
            operator: Some(op),
            right: &head[i + width..],
            has_equals,
            answer,
        },
        None => ParsedProblem {
            left: head,
            operator: None,
            right: "",
            has_equals,
            answer,
        },
    }
}

/// A single math fact. Immutable once built; serialized as its canonical
/// string (`"7+7=14"`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Problem {
    pub operand_a: u32,
    pub operand_b: u32,
    pub operator: Operator,
    pub answer: u32,
}

impl Problem {
    pub fn new(operand_a: u32, operator: Operator, operand_b: u32) -> Result<Self, ProblemError> {
        let label = format!("{operand_a}{}{operand_b}", operator.symbol());
        let answer = match operator.apply(operand_a, operand_b) {
            Some(answer) => answer,
            None if operator == Operator::Divide && operand_b == 0 => {
                return Err(ProblemError::DivisionByZero(label));
            }
            None => return Err(ProblemError::NotWholeNumber(label)),
        };
        let problem = Self {
            operand_a,
            operand_b,
            operator,
            answer,
        };
        problem.check_fits()?;
        Ok(problem)
    }

    fn check_fits(&self) -> Result<(), ProblemError> {
        if digit_count(self.operand_a) > MAX_WIDE_DIGITS
            || digit_count(self.operand_b) > MAX_OPERAND_B_DIGITS
            || digit_count(self.answer) > MAX_WIDE_DIGITS
        {
            return Err(ProblemError::TooWide(self.canonical()));
        }
        Ok(())
    }

    /// `"a{op}b=answer"` with the stored operator symbol.
    pub fn canonical(&self) -> String {
        format!(
            "{}{}{}={}",
            self.operand_a,
            self.operator.symbol(),
            self.operand_b,
            self.answer
        )
    }

    /// The stimulus without its answer, e.g. `"7+7="`.
    pub fn prompt(&self) -> String {
        format!(
            "{}{}{}=",
            self.operand_a,
            self.operator.symbol(),
            self.operand_b
        )
    }

    pub fn answer_digits(&self) -> usize {
        digit_count(self.answer)
    }
}

pub fn digit_count(n: u32) -> usize {
    let mut n = n;
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

fn parse_number(fact: &str, part: &str) -> Result<u32, ProblemError> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProblemError::InvalidNumber {
            fact: fact.to_string(),
            part: part.to_string(),
        });
    }
    part.parse().map_err(|_| ProblemError::InvalidNumber {
        fact: fact.to_string(),
        part: part.to_string(),
    })
}

impl FromStr for Problem {
    type Err = ProblemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let parsed = parse_problem_string(&fact);

        let Some(operator) = parsed.operator else {
            return Err(ProblemError::MissingOperator(fact));
        };
        if parsed.left.is_empty() || parsed.right.is_empty() {
            return Err(ProblemError::MissingOperand(fact));
        }
        if !parsed.has_equals {
            return Err(ProblemError::MissingEquals(fact));
        }
        if parsed.answer.is_empty() {
            return Err(ProblemError::MissingAnswer(fact));
        }

        let a = parse_number(&fact, parsed.left)?;
        let b = parse_number(&fact, parsed.right)?;
        let stated = parse_number(&fact, parsed.answer)?;

        let problem = Problem::new(a, operator, b).map_err(|e| match e {
            ProblemError::DivisionByZero(_) => ProblemError::DivisionByZero(fact.clone()),
            ProblemError::NotWholeNumber(_) => ProblemError::NotWholeNumber(fact.clone()),
            other => other,
        })?;
        if problem.answer != stated {
            return Err(ProblemError::WrongAnswer {
                fact,
                stated,
                expected: problem.answer,
            });
        }
        Ok(problem)
    }
}

impl TryFrom<String> for Problem {
    type Error = ProblemError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Problem> for String {
    fn from(problem: Problem) -> Self {
        problem.canonical()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
