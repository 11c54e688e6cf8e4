//! Parser for the `pass_if` grammar used by `deterministic` checks:
//! a comparison operator followed by a number, e.g. `>= 0.8`. Grounded
//! in the original runner's `_evaluate_pass_condition`: an unparseable
//! or operator-less condition defaults to *pass*, it does not raise.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(self, value: f64, threshold: f64) -> bool {
        match self {
            CompareOp::Lt => value < threshold,
            CompareOp::Le => value <= threshold,
            CompareOp::Gt => value > threshold,
            CompareOp::Ge => value >= threshold,
            CompareOp::Eq => value == threshold,
            CompareOp::Ne => value != threshold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassCondition {
    pub op: CompareOp,
    pub threshold: f64,
}

impl PassCondition {
    pub fn evaluate(&self, value: f64) -> bool {
        self.op.apply(value, self.threshold)
    }
}

#[derive(Debug)]
pub struct PassConditionError(pub String);

impl fmt::Display for PassConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pass_if condition: {}", self.0)
    }
}

impl std::error::Error for PassConditionError {}

const OPERATORS: &[(&str, CompareOp)] = &[
    (">=", CompareOp::Ge),
    ("<=", CompareOp::Le),
    ("==", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    ("<>", CompareOp::Ne),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
    ("=", CompareOp::Eq),
];

/// Parses e.g. `">= 0.8"`, `"== 1"`, `"< -3"`, `"= 1"`, `"<> 2"`.
/// Whitespace between the operator and number is optional.
pub fn parse(input: &str) -> Result<PassCondition, PassConditionError> {
    let trimmed = input.trim();
    let (op, rest) = OPERATORS
        .iter()
        .find_map(|(text, op)| trimmed.strip_prefix(text).map(|rest| (*op, rest)))
        .ok_or_else(|| PassConditionError(format!("no recognized operator in '{input}'")))?;

    let threshold = rest
        .trim()
        .parse::<f64>()
        .map_err(|_| PassConditionError(format!("no numeric threshold in '{input}'")))?;

    Ok(PassCondition { op, threshold })
}

/// Evaluates `condition` against `value`, defaulting to `true` (pass)
/// when the condition is unparseable — matching the original runner's
/// "no valid condition, default to pass" behavior rather than raising.
pub fn passes(condition: &str, value: f64) -> bool {
    match parse(condition) {
        Ok(cond) => cond.evaluate(value),
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ge_and_evaluates() {
        let cond = parse(">= 0.8").unwrap();
        assert!(cond.evaluate(0.8));
        assert!(cond.evaluate(0.9));
        assert!(!cond.evaluate(0.7));
    }

    #[test]
    fn parses_without_whitespace() {
        let cond = parse("==1").unwrap();
        assert!(cond.evaluate(1.0));
        assert!(!cond.evaluate(0.0));
    }

    #[test]
    fn supports_single_equals_and_diamond_not_equal() {
        assert!(parse("=5").unwrap().evaluate(5.0));
        assert!(parse("<>5").unwrap().evaluate(4.0));
        assert!(!parse("<>5").unwrap().evaluate(5.0));
    }

    #[test]
    fn garbage_condition_defaults_to_pass() {
        assert!(parse("maybe").is_err());
        assert!(passes("maybe", 0.0));
    }
}
