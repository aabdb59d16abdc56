use serde::{Deserialize, Serialize};

use crate::facts::problem::{MAX_OPERAND_B_DIGITS, MAX_WIDE_DIGITS};
use crate::facts::{Operator, Problem, parse_problem_string};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// The learner reconstructs the whole fact, `a{op}b=c`.
    ProblemEntry,
    /// The learner types only the answer digits. `=` is a control key here.
    AnswerEntry,
}

/// Why an input character left the buffer unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejected {
    NotAllowed(char),
    Full,
    OperatorRepeated,
    EqualsRepeated,
    OutOfOrder(char),
    /// The digit would make the current operand or answer wider than its
    /// row of the frame.
    TooWide,
}

/// What the learner has typed or clicked for the current problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryBuffer {
    mode: EntryMode,
    text: String,
    capacity: usize,
}

impl EntryBuffer {
    pub fn new(mode: EntryMode, capacity: usize) -> Self {
        Self {
            mode,
            text: String::with_capacity(capacity),
            capacity,
        }
    }

    /// Sized to the expected response for `problem`.
    pub fn for_problem(problem: &Problem, mode: EntryMode) -> Self {
        let capacity = match mode {
            EntryMode::ProblemEntry => problem.canonical().len(),
            EntryMode::AnswerEntry => problem.answer_digits(),
        };
        Self::new(mode, capacity)
    }

    pub fn mode(&self) -> EntryMode {
        self.mode
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `ch` if the current mode allows it at this point; otherwise the
    /// buffer is left exactly as it was.
    pub fn append(&mut self, ch: char) -> Result<&str, Rejected> {
        let stored = self.admit(ch)?;
        if self.text.len() >= self.capacity {
            return Err(Rejected::Full);
        }
        self.text.push(stored);
        Ok(self.text.as_str())
    }

    fn admit(&self, ch: char) -> Result<char, Rejected> {
        if self.mode == EntryMode::AnswerEntry {
            if !ch.is_ascii_digit() {
                return Err(Rejected::NotAllowed(ch));
            }
            if self.text.len() >= MAX_WIDE_DIGITS {
                return Err(Rejected::TooWide);
            }
            return Ok(ch);
        }

        let parsed = parse_problem_string(&self.text);
        if ch.is_ascii_digit() {
            let (part, limit) = if parsed.has_equals {
                (parsed.answer, MAX_WIDE_DIGITS)
            } else if parsed.operator.is_some() {
                (parsed.right, MAX_OPERAND_B_DIGITS)
            } else {
                (parsed.left, MAX_WIDE_DIGITS)
            };
            if part.len() >= limit {
                return Err(Rejected::TooWide);
            }
            return Ok(ch);
        }
        if let Some(op) = Operator::from_char(ch) {
            if parsed.operator.is_some() {
                return Err(Rejected::OperatorRepeated);
            }
            if parsed.left.is_empty() {
                return Err(Rejected::OutOfOrder(ch));
            }
            return Ok(op.symbol());
        }
        if ch == '=' {
            if parsed.has_equals {
                return Err(Rejected::EqualsRepeated);
            }
            if parsed.operator.is_none() || parsed.right.is_empty() {
                return Err(Rejected::OutOfOrder(ch));
            }
            return Ok('=');
        }
        Err(Rejected::NotAllowed(ch))
    }

    /// Drops the last character. Empty buffers stay empty.
    pub fn backspace(&mut self) -> &str {
        self.text.pop();
        &self.text
    }

    pub fn clear(&mut self) -> &str {
        self.text.clear();
        &self.text
    }

    /// Exact comparison against `problem`: the canonical string in problem
    /// entry, the numeric answer in answer entry.
    pub fn matches(&self, problem: &Problem) -> bool {
        match self.mode {
            EntryMode::ProblemEntry => self.text == problem.canonical(),
            EntryMode::AnswerEntry => self
                .text
                .parse::<u32>()
                .is_ok_and(|answer| answer == problem.answer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(fact: &str) -> Problem {
        fact.parse().unwrap()
    }

    fn typed(buffer: &mut EntryBuffer, text: &str) {
        for ch in text.chars() {
            let _ = buffer.append(ch);
        }
    }

    #[test]
    fn problem_entry_accepts_full_fact() {
        let p = problem("7+7=14");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "7+7=14");
        assert_eq!(buffer.as_str(), "7+7=14");
        assert!(buffer.matches(&p));
    }

    #[test]
    fn rejected_chars_leave_buffer_unchanged() {
        let p = problem("12x3=36");
        let disallowed = ['a', ' ', '.', '(', '%', '?'];
        for prefix in ["", "1", "12", "12x", "12x3", "12x3=", "12x3=3"] {
            for &ch in &disallowed {
                let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
                typed(&mut buffer, prefix);
                let before = buffer.clone();
                assert!(buffer.append(ch).is_err());
                assert_eq!(buffer, before, "{ch:?} after {prefix:?}");
            }
        }
    }

    #[test]
    fn operator_only_once_and_not_first() {
        let p = problem("7+7=14");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        assert_eq!(buffer.append('+'), Err(Rejected::OutOfOrder('+')));
        typed(&mut buffer, "7+");
        assert_eq!(buffer.append('-'), Err(Rejected::OperatorRepeated));
        assert_eq!(buffer.as_str(), "7+");
    }

    #[test]
    fn equals_requires_both_operands() {
        let p = problem("7+7=14");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "7");
        assert_eq!(buffer.append('='), Err(Rejected::OutOfOrder('=')));
        typed(&mut buffer, "+");
        assert_eq!(buffer.append('='), Err(Rejected::OutOfOrder('=')));
        typed(&mut buffer, "7=");
        assert_eq!(buffer.append('='), Err(Rejected::EqualsRepeated));
        assert_eq!(buffer.as_str(), "7+7=");
    }

    #[test]
    fn division_glyph_is_stored_as_slash() {
        let p = problem("8/2=4");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "8\u{00f7}2=4");
        assert_eq!(buffer.as_str(), "8/2=4");
        assert!(buffer.matches(&p));
    }

    #[test]
    fn length_is_bounded_by_target() {
        let p = problem("2+2=4");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "22+2=");
        assert_eq!(buffer.append('4'), Err(Rejected::Full));
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn answer_entry_takes_digits_only() {
        let p = problem("6x7=42");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::AnswerEntry);
        assert_eq!(buffer.append('='), Err(Rejected::NotAllowed('=')));
        assert_eq!(buffer.append('x'), Err(Rejected::NotAllowed('x')));
        typed(&mut buffer, "42");
        assert!(buffer.matches(&p));
        assert_eq!(buffer.append('1'), Err(Rejected::Full));
    }

    #[test]
    fn operands_are_bounded_by_their_rows() {
        let p = problem("144/12=12");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "144");
        assert_eq!(buffer.append('4'), Err(Rejected::TooWide));
        assert_eq!(buffer.as_str(), "144");

        typed(&mut buffer, "/12");
        assert_eq!(buffer.append('3'), Err(Rejected::TooWide));
        assert_eq!(buffer.as_str(), "144/12");

        typed(&mut buffer, "=123");
        assert_eq!(buffer.as_str(), "144/12=12");
    }

    #[test]
    fn every_accepted_prefix_lays_out_losslessly() {
        use crate::display::layout;

        let p = problem("144/12=12");
        for attempt in ["1444/12=12", "144/123=12", "99x99=9", "1234", "7+7=1444"] {
            let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
            for ch in attempt.chars() {
                let _ = buffer.append(ch);
                assert_eq!(layout(buffer.as_str()).reconstruct(), buffer.as_str(), "{attempt}");
            }
        }
    }

    #[test]
    fn answer_entry_is_bounded_by_the_answer_row() {
        let mut buffer = EntryBuffer::new(EntryMode::AnswerEntry, 5);
        typed(&mut buffer, "1234");
        assert_eq!(buffer.as_str(), "123");
        assert_eq!(buffer.append('4'), Err(Rejected::TooWide));
    }

    #[test]
    fn backspace_on_empty_is_noop() {
        let mut buffer = EntryBuffer::new(EntryMode::ProblemEntry, 6);
        assert_eq!(buffer.backspace(), "");
        typed(&mut buffer, "7+");
        assert_eq!(buffer.backspace(), "7");
        // the operator can be entered again once removed
        assert!(buffer.append('x').is_ok());
    }

    #[test]
    fn self_correction_before_check() {
        let p = problem("1+1=2");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "1+1=1");
        buffer.backspace();
        typed(&mut buffer, "2");
        assert!(buffer.matches(&p));
    }

    #[test]
    fn clear_empties_buffer() {
        let p = problem("1+1=2");
        let mut buffer = EntryBuffer::for_problem(&p, EntryMode::ProblemEntry);
        typed(&mut buffer, "1+1");
        assert_eq!(buffer.clear(), "");
        assert!(!buffer.matches(&p));
    }
}
