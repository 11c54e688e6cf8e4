//! Tree-walking interpreter over `ast::Expr`. No helper beyond the
//! fixed allow-list is reachable — `Expr::Call` with any other name is
//! an `EvalError::UnknownHelper`, not a fallback to anything host-side.

use crate::ast::{BinOp, Expr, UnOp};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug)]
pub enum EvalError {
    UnknownVariable(String),
    UnknownHelper(String),
    WrongArity { helper: String, got: usize },
    NotIndexable { type_name: &'static str },
    NotNumeric { type_name: &'static str },
    DivideByZero,
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::UnknownVariable(name) => write!(f, "unknown variable '{name}'"),
            EvalError::UnknownHelper(name) => write!(f, "unknown helper '{name}'"),
            EvalError::WrongArity { helper, got } => {
                write!(f, "helper '{helper}' called with {got} arguments")
            }
            EvalError::NotIndexable { type_name } => write!(f, "value of type {type_name} is not indexable"),
            EvalError::NotNumeric { type_name } => write!(f, "value of type {type_name} is not numeric"),
            EvalError::DivideByZero => write!(f, "division by zero"),
        }
    }
}

impl std::error::Error for EvalError {}

const HELPERS: &[&str] = &[
    "len", "min", "max", "abs", "round", "sum", "any", "all", "int", "float", "str", "bool",
];

pub fn is_known_helper(name: &str) -> bool {
    HELPERS.contains(&name)
}

/// Evaluates an `Expr` against a flat variable map. The map is the only
/// source of identifiers; there is no global or host environment.
pub struct Evaluator<'a> {
    vars: &'a BTreeMap<String, Value>,
}

impl<'a> Evaluator<'a> {
    pub fn new(vars: &'a BTreeMap<String, Value>) -> Self {
        Self { vars }
    }

    pub fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Num(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Var(name) => self
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::UnknownVariable(name.clone())),
            Expr::Field(base, name) => {
                let base = self.eval(base)?;
                match base {
                    Value::Map(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
                    other => Err(EvalError::NotIndexable { type_name: other.type_name() }),
                }
            }
            Expr::Index(base, index) => {
                let base = self.eval(base)?;
                let index = self.eval(index)?;
                match (&base, &index) {
                    (Value::List(items), Value::Number(n)) => {
                        let i = *n as i64;
                        let idx = if i < 0 { (items.len() as i64 + i) as usize } else { i as usize };
                        Ok(items.get(idx).cloned().unwrap_or(Value::Null))
                    }
                    (Value::Map(map), Value::String(key)) => Ok(map.get(key).cloned().unwrap_or(Value::Null)),
                    _ => Err(EvalError::NotIndexable { type_name: base.type_name() }),
                }
            }
            Expr::Unary(op, inner) => {
                let value = self.eval(inner)?;
                match op {
                    UnOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnOp::Neg => {
                        let n = value.as_f64().ok_or(EvalError::NotNumeric { type_name: value.type_name() })?;
                        Ok(Value::Number(-n))
                    }
                }
            }
            Expr::Binary(op, left, right) => self.eval_binary(*op, left, right),
            Expr::Call(name, args) => self.eval_call(name, args),
        }
    }

    fn eval_binary(&self, op: BinOp, left: &Expr, right: &Expr) -> Result<Value, EvalError> {
        if op == BinOp::And {
            let l = self.eval(left)?;
            if !l.is_truthy() {
                return Ok(l);
            }
            return self.eval(right);
        }
        if op == BinOp::Or {
            let l = self.eval(left)?;
            if l.is_truthy() {
                return Ok(l);
            }
            return self.eval(right);
        }

        let l = self.eval(left)?;
        let r = self.eval(right)?;

        match op {
            BinOp::Eq => Ok(Value::Bool(values_equal(&l, &r))),
            BinOp::Ne => Ok(Value::Bool(!values_equal(&l, &r))),
            BinOp::Add if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) => {
                Ok(Value::String(format!("{l}{r}")))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let a = l.as_f64().ok_or(EvalError::NotNumeric { type_name: l.type_name() })?;
                let b = r.as_f64().ok_or(EvalError::NotNumeric { type_name: r.type_name() })?;
                let result = match op {
                    BinOp::Add => a + b,
                    BinOp::Sub => a - b,
                    BinOp::Mul => a * b,
                    BinOp::Div => {
                        if b == 0.0 {
                            return Err(EvalError::DivideByZero);
                        }
                        a / b
                    }
                    BinOp::Mod => {
                        if b == 0.0 {
                            return Err(EvalError::DivideByZero);
                        }
                        a % b
                    }
                    _ => unreachable!(),
                };
                Ok(Value::Number(result))
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let a = l.as_f64().ok_or(EvalError::NotNumeric { type_name: l.type_name() })?;
                let b = r.as_f64().ok_or(EvalError::NotNumeric { type_name: r.type_name() })?;
                let result = match op {
                    BinOp::Lt => a < b,
                    BinOp::Le => a <= b,
                    BinOp::Gt => a > b,
                    BinOp::Ge => a >= b,
                    _ => unreachable!(),
                };
                Ok(Value::Bool(result))
            }
            BinOp::And | BinOp::Or => unreachable!("handled above"),
        }
    }

    fn eval_call(&self, name: &str, args: &[Expr]) -> Result<Value, EvalError> {
        if !is_known_helper(name) {
            return Err(EvalError::UnknownHelper(name.to_string()));
        }
        let values: Result<Vec<Value>, EvalError> = args.iter().map(|a| self.eval(a)).collect();
        let values = values?;

        match name {
            "len" => {
                let v = one_arg(name, &values)?;
                match v {
                    Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                    Value::List(items) => Ok(Value::Number(items.len() as f64)),
                    Value::Map(map) => Ok(Value::Number(map.len() as f64)),
                    other => Err(EvalError::NotIndexable { type_name: other.type_name() }),
                }
            }
            "abs" => {
                let v = one_arg(name, &values)?;
                let n = v.as_f64().ok_or(EvalError::NotNumeric { type_name: v.type_name() })?;
                Ok(Value::Number(n.abs()))
            }
            "round" => {
                let n = match values.len() {
                    1 => values[0].as_f64().ok_or(EvalError::NotNumeric { type_name: values[0].type_name() })?,
                    _ => return Err(EvalError::WrongArity { helper: name.to_string(), got: values.len() }),
                };
                Ok(Value::Number(n.round()))
            }
            "min" | "max" => {
                let nums = numeric_operands(name, &values)?;
                if nums.is_empty() {
                    return Err(EvalError::WrongArity { helper: name.to_string(), got: 0 });
                }
                let result = if name == "min" {
                    nums.into_iter().fold(f64::INFINITY, f64::min)
                } else {
                    nums.into_iter().fold(f64::NEG_INFINITY, f64::max)
                };
                Ok(Value::Number(result))
            }
            "sum" => {
                let nums = numeric_operands(name, &values)?;
                Ok(Value::Number(nums.into_iter().sum()))
            }
            "any" => {
                let operands = flatten_operands(&values);
                Ok(Value::Bool(operands.iter().any(|v| v.is_truthy())))
            }
            "all" => {
                let operands = flatten_operands(&values);
                Ok(Value::Bool(operands.iter().all(|v| v.is_truthy())))
            }
            "int" => {
                let v = one_arg(name, &values)?;
                let n = v.as_f64().ok_or(EvalError::NotNumeric { type_name: v.type_name() })?;
                Ok(Value::Number(n.trunc()))
            }
            "float" => {
                let v = one_arg(name, &values)?;
                let n = v.as_f64().ok_or(EvalError::NotNumeric { type_name: v.type_name() })?;
                Ok(Value::Number(n))
            }
            "str" => {
                let v = one_arg(name, &values)?;
                Ok(Value::String(v.to_string()))
            }
            "bool" => {
                let v = one_arg(name, &values)?;
                Ok(Value::Bool(v.is_truthy()))
            }
            _ => unreachable!("checked by is_known_helper"),
        }
    }
}

fn one_arg(name: &str, values: &[Value]) -> Result<Value, EvalError> {
    if values.len() != 1 {
        return Err(EvalError::WrongArity { helper: name.to_string(), got: values.len() });
    }
    Ok(values[0].clone())
}

/// `min`/`max`/`sum` accept either a single list argument or several
/// scalar arguments, mirroring the flexible-arity call convention the
/// original scoring formulas rely on.
fn numeric_operands(name: &str, values: &[Value]) -> Result<Vec<f64>, EvalError> {
    let operands = flatten_operands(values);
    operands
        .iter()
        .map(|v| v.as_f64().ok_or(EvalError::NotNumeric { type_name: v.type_name() }))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| EvalError::WrongArity { helper: name.to_string(), got: values.len() })
}

fn flatten_operands(values: &[Value]) -> Vec<Value> {
    if let [Value::List(items)] = values {
        items.clone()
    } else {
        values.to_vec()
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => format!("{a:?}") == format!("{b:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn vars(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn evaluates_arithmetic_and_comparison() {
        let expr = parse("score * 2 >= 10").unwrap();
        let vars = vars(&[("score", Value::Number(5.0))]);
        let result = Evaluator::new(&vars).eval(&expr).unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn short_circuits_and_or() {
        let vars = BTreeMap::new();
        let expr = parse("false and undefined_var").unwrap();
        let result = Evaluator::new(&vars).eval(&expr).unwrap();
        assert_eq!(result, Value::Bool(false));
    }

    #[test]
    fn helper_min_accepts_list_or_varargs() {
        let vars = BTreeMap::new();
        let list_form = Evaluator::new(&vars).eval(&parse("min(1, 2, 3)").unwrap()).unwrap();
        assert_eq!(list_form, Value::Number(1.0));
    }

    #[test]
    fn rejects_unknown_helper() {
        let vars = BTreeMap::new();
        let expr = parse("eval(1)").unwrap();
        let err = Evaluator::new(&vars).eval(&expr).unwrap_err();
        assert!(matches!(err, EvalError::UnknownHelper(name) if name == "eval"));
    }

    #[test]
    fn field_and_index_access_on_nested_values() {
        let mut order = std::collections::BTreeMap::new();
        order.insert("total".to_string(), Value::Number(42.0));
        let vars = vars(&[("order", Value::Map(order))]);
        let expr = parse("order.total").unwrap();
        let result = Evaluator::new(&vars).eval(&expr).unwrap();
        assert_eq!(result, Value::Number(42.0));
    }
}
