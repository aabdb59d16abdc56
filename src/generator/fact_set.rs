use crate::error::ProblemError;
use crate::facts::{Operation, Problem};

/// Largest operand a standard fact set may use and still fit the frame.
pub const MAX_STANDARD_OPERAND: u32 = 12;

/// The full fact family for `operation` with operands up to `max_operand`.
///
/// Subtraction and division are built as inverses of addition and
/// multiplication so every fact has a whole-number answer; division never
/// uses a zero divisor.
pub fn standard_facts(operation: Operation, max_operand: u32) -> Result<Vec<Problem>, ProblemError> {
    let max = max_operand.min(MAX_STANDARD_OPERAND);
    let op = operation.operator();
    let mut facts = Vec::new();

    match operation {
        Operation::Addition | Operation::Multiplication => {
            for a in 0..=max {
                for b in 0..=max {
                    facts.push(Problem::new(a, op, b)?);
                }
            }
        }
        Operation::Subtraction => {
            for b in 0..=max {
                for diff in 0..=max {
                    facts.push(Problem::new(b + diff, op, b)?);
                }
            }
        }
        Operation::Division => {
            for divisor in 1..=max {
                for quotient in 0..=max {
                    facts.push(Problem::new(divisor * quotient, op, divisor)?);
                }
            }
        }
    }

    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::Operator;

    #[test]
    fn addition_family_size() {
        let facts = standard_facts(Operation::Addition, 2).unwrap();
        assert_eq!(facts.len(), 9);
        assert_eq!(facts[0].canonical(), "0+0=0");
        assert_eq!(facts[8].canonical(), "2+2=4");
    }

    #[test]
    fn subtraction_answers_are_non_negative() {
        let facts = standard_facts(Operation::Subtraction, 5).unwrap();
        assert!(facts.iter().all(|p| p.operand_a >= p.operand_b));
        assert!(facts.iter().all(|p| p.operator == Operator::Subtract));
    }

    #[test]
    fn division_has_no_zero_divisor() {
        let facts = standard_facts(Operation::Division, 12).unwrap();
        assert!(facts.iter().all(|p| p.operand_b != 0));
        assert!(facts.iter().any(|p| p.canonical() == "144/12=12"));
    }

    #[test]
    fn operand_cap_applies() {
        let facts = standard_facts(Operation::Multiplication, 50).unwrap();
        assert_eq!(facts.len(), 13 * 13);
    }
}
