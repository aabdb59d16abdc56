use crate::facts::{Operator, Problem, parse_problem_string};
use crate::session::entry::EntryMode;

pub const ROWS: usize = 3;
pub const COLS: usize = 3;
pub const BLANK: char = ' ';

/// A vertically stacked fact:
///
/// ```text
///   row 0:  [ ][a][a]     operand A, right-justified
///   row 1:  [op][b][b]    operator glyph, then operand B right-justified
///           ---------     divider, drawn when `=` is present
///   row 2:  [c][c][c]     answer, right-justified
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    pub cells: [[char; COLS]; ROWS],
    pub divider: bool,
}

impl Frame {
    pub fn blank() -> Self {
        Self {
            cells: [[BLANK; COLS]; ROWS],
            divider: false,
        }
    }

    pub fn row(&self, row: usize) -> String {
        self.cells[row].iter().collect()
    }

    fn digits(&self, row: usize, from_col: usize) -> String {
        self.cells[row][from_col..]
            .iter()
            .filter(|c| **c != BLANK)
            .collect()
    }

    /// Reads the non-blank cells back into a problem string, mapping the
    /// operator glyph back to its stored symbol.
    pub fn reconstruct(&self) -> String {
        let mut text = self.digits(0, 0);
        if let Some(op) = Operator::from_char(self.cells[1][0]) {
            text.push(op.symbol());
            text.push_str(&self.digits(1, 1));
        }
        if self.divider {
            text.push('=');
            text.push_str(&self.digits(2, 0));
        }
        text
    }
}

/// Right-justifies `digits` into `cells`. Digits that do not fit are dropped
/// from the left; problems are checked to fit when they are parsed.
fn fill_right(cells: &mut [char], digits: &str) {
    let chars: Vec<char> = digits.chars().collect();
    let visible = &chars[chars.len().saturating_sub(cells.len())..];
    let offset = cells.len() - visible.len();
    cells[offset..].copy_from_slice(visible);
}

/// Lays out any full or partial problem string.
///
/// Without an operator only row 0 is filled; without `=` row 2 stays blank.
/// The operator glyph always takes column 0 of row 1, so operand B has two
/// cells. A division fact like `8/2=4` renders as `[÷][ ][2]` and `84/12=7`
/// as `[÷][1][2]`.
pub fn layout(text: &str) -> Frame {
    let parsed = parse_problem_string(text);
    let mut frame = Frame::blank();

    fill_right(&mut frame.cells[0], parsed.left);

    if let Some(op) = parsed.operator {
        let row = &mut frame.cells[1];
        row[0] = op.glyph();
        fill_right(&mut row[1..], parsed.right);
    }

    if parsed.has_equals {
        frame.divider = true;
        fill_right(&mut frame.cells[2], parsed.answer);
    }

    frame
}

/// The stimulus panel: the whole fact when copying, the fact without its
/// answer when only the answer is typed.
pub fn stimulus(problem: &Problem, mode: EntryMode) -> Frame {
    match mode {
        EntryMode::ProblemEntry => layout(&problem.canonical()),
        EntryMode::AnswerEntry => layout(&problem.prompt()),
    }
}

/// The response panel for what the learner has entered so far.
pub fn compose(problem: &Problem, entered: &str, mode: EntryMode) -> Frame {
    match mode {
        EntryMode::ProblemEntry => layout(entered),
        EntryMode::AnswerEntry => layout(&format!("{}{entered}", problem.prompt())),
    }
}

/// How the divider under operand B is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineTone {
    Transparent,
    Solid,
    Gray,
}

/// Uses the same parse as `layout`, so the line is solid exactly when the
/// frame has a divider.
pub fn equals_line(text: &str, is_covered: bool) -> LineTone {
    if parse_problem_string(text).has_equals {
        LineTone::Solid
    } else if is_covered {
        LineTone::Gray
    } else {
        LineTone::Transparent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Operation;
    use crate::generator::fact_set::standard_facts;

    fn rows(frame: &Frame) -> [String; 3] {
        [frame.row(0), frame.row(1), frame.row(2)]
    }

    #[test]
    fn full_fact_layout() {
        let frame = layout("7+7=14");
        assert_eq!(rows(&frame), ["  7", "+ 7", " 14"]);
        assert!(frame.divider);
    }

    #[test]
    fn no_equals_leaves_answer_row_blank() {
        let frame = layout("12x3");
        assert_eq!(rows(&frame), [" 12", "\u{00d7} 3", "   "]);
        assert!(!frame.divider);
    }

    #[test]
    fn bare_digits_fill_row_zero_only() {
        let frame = layout("5");
        assert_eq!(rows(&frame), ["  5", "   ", "   "]);
    }

    #[test]
    fn operator_without_operand_b() {
        let frame = layout("5-");
        assert_eq!(rows(&frame), ["  5", "-  ", "   "]);
    }

    #[test]
    fn empty_text_is_blank() {
        assert_eq!(layout(""), Frame::blank());
    }

    #[test]
    fn division_single_digit_divisor_pads_tens_cell() {
        let frame = layout("8/2=4");
        assert_eq!(frame.cells[1], ['\u{00f7}', BLANK, '2']);
        assert_eq!(rows(&frame), ["  8", "\u{00f7} 2", "  4"]);
    }

    #[test]
    fn division_double_digit_divisor_fills_tens_cell() {
        let frame = layout("144/12=12");
        assert_eq!(frame.cells[1], ['\u{00f7}', '1', '2']);
        assert_eq!(rows(&frame), ["144", "\u{00f7}12", " 12"]);
    }

    #[test]
    fn reconstruct_round_trips_every_standard_fact() {
        for operation in Operation::ALL {
            for problem in standard_facts(operation, 12).unwrap() {
                let canonical = problem.canonical();
                assert_eq!(layout(&canonical).reconstruct(), canonical);
            }
        }
    }

    #[test]
    fn answer_entry_compose_shows_stimulus_operands() {
        let problem: Problem = "6x7=42".parse().unwrap();
        let frame = compose(&problem, "4", EntryMode::AnswerEntry);
        assert_eq!(rows(&frame), ["  6", "\u{00d7} 7", "  4"]);
        let stim = stimulus(&problem, EntryMode::AnswerEntry);
        assert_eq!(stim.row(2), "   ");
        assert!(stim.divider);
    }

    #[test]
    fn equals_line_tones() {
        assert_eq!(equals_line("", false), LineTone::Transparent);
        assert_eq!(equals_line("7+7", false), LineTone::Transparent);
        assert_eq!(equals_line("7+7", true), LineTone::Gray);
        assert_eq!(equals_line("7+7=", true), LineTone::Solid);
        assert_eq!(equals_line("7+7=14", false), LineTone::Solid);
    }

    #[test]
    fn equals_line_agrees_with_divider() {
        for text in ["", "1", "1+", "1+1", "1+1=", "1+1=2"] {
            let solid = equals_line(text, false) == LineTone::Solid;
            assert_eq!(solid, layout(text).divider, "{text:?}");
        }
    }
}
