//! Sandboxed expression evaluator.
//!
//! Covers condition filtering (`step.condition`, `{{#if}}` blocks),
//! `deterministic` evaluation checks, and scoring formulas. There is no
//! escape hatch to host-language `eval`: the grammar is closed, and the
//! only callable names are the fixed helper allow-list in `eval`.

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod pass_condition;
pub mod value;

pub use ast::Expr;
pub use eval::{EvalError, Evaluator};
pub use parser::{parse, ParseError};
pub use pass_condition::{parse as parse_pass_condition, CompareOp, PassCondition, PassConditionError};
pub use value::Value;

/// Parses and evaluates `source` against `vars` in one call; the
/// common case for condition filtering where the AST isn't reused.
pub fn eval_str(
    source: &str,
    vars: &std::collections::BTreeMap<String, Value>,
) -> Result<Value, EvalStrError> {
    let expr = parse(source).map_err(EvalStrError::Parse)?;
    Evaluator::new(vars).eval(&expr).map_err(EvalStrError::Eval)
}

#[derive(Debug)]
pub enum EvalStrError {
    Parse(ParseError),
    Eval(EvalError),
}

impl std::fmt::Display for EvalStrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalStrError::Parse(e) => write!(f, "{e}"),
            EvalStrError::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for EvalStrError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eval_str_round_trips_a_condition() {
        let mut vars = std::collections::BTreeMap::new();
        vars.insert("tier".to_string(), Value::String("gold".to_string()));
        let result = eval_str("tier == \"gold\"", &vars).unwrap();
        assert_eq!(result, Value::Bool(true));
    }
}
