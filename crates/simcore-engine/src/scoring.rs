//! Turns a map of check results into one final score, per the scoring
//! algorithm: numeric vector → formula or weighted average → optional
//! normalize-and-clamp.

use std::collections::HashMap;

use serde_json::Value as Json;
use simcore_types::{CheckResult, ScoringConfig};

/// Extracts this check's contribution to the numeric vector `N`, or
/// `None` if it contributes nothing (skipped or errored).
fn numeric_contribution(result: &CheckResult) -> Option<f64> {
    match result {
        CheckResult::Passed { passed, .. } => Some(if *passed { 1.0 } else { 0.0 }),
        CheckResult::Value { value } => value.as_f64(),
        CheckResult::Skipped { .. } | CheckResult::Error { .. } => None,
    }
}

pub fn compute_score(
    checks: &HashMap<String, CheckResult>,
    scoring: &ScoringConfig,
    env_state: &Json,
) -> f64 {
    let numeric: HashMap<&str, f64> = checks
        .iter()
        .filter_map(|(name, result)| numeric_contribution(result).map(|n| (name.as_str(), n)))
        .collect();

    let raw = if let Some(formula) = scoring.formula.as_deref() {
        match eval_formula(formula, &numeric, env_state) {
            Ok(score) => score,
            Err(_) => weighted_average(&numeric, scoring),
        }
    } else {
        weighted_average(&numeric, scoring)
    };

    if scoring.normalize && scoring.max_score != scoring.min_score {
        let rescaled = (raw - scoring.min_score) / (scoring.max_score - scoring.min_score);
        rescaled.clamp(0.0, 1.0)
    } else {
        raw
    }
}

fn weighted_average(numeric: &HashMap<&str, f64>, scoring: &ScoringConfig) -> f64 {
    if numeric.is_empty() {
        return 0.0;
    }
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (name, n) in numeric {
        let w = scoring.weights.get(*name).copied().unwrap_or(1.0);
        weighted_sum += w * n;
        weight_total += w;
    }
    if weight_total == 0.0 {
        0.0
    } else {
        weighted_sum / weight_total
    }
}

fn eval_formula(
    formula: &str,
    numeric: &HashMap<&str, f64>,
    env_state: &Json,
) -> Result<f64, simcore_expr::EvalStrError> {
    let mut vars: std::collections::BTreeMap<String, simcore_expr::Value> = numeric
        .iter()
        .map(|(name, n)| (name.to_string(), simcore_expr::Value::Number(*n)))
        .collect();
    vars.insert("env_state".to_string(), simcore_expr::Value::from(env_state));
    let value = simcore_expr::eval_str(formula, &vars)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn passed(passed: bool) -> CheckResult {
        CheckResult::Passed {
            passed,
            extra: json!({}),
        }
    }

    #[test]
    fn weighted_average_falls_back_with_no_formula() {
        let mut checks = HashMap::new();
        checks.insert("a".to_string(), passed(true));
        checks.insert("b".to_string(), passed(false));
        let score = compute_score(&checks, &ScoringConfig::default(), &Json::Null);
        assert_eq!(score, 0.5);
    }

    #[test]
    fn formula_combines_named_checks() {
        let mut checks = HashMap::new();
        checks.insert("A".to_string(), passed(true));
        checks.insert("B".to_string(), passed(false));
        checks.insert("C".to_string(), passed(true));
        let scoring = ScoringConfig {
            formula: Some("A*2 + B + C*3".to_string()),
            ..Default::default()
        };
        let score = compute_score(&checks, &scoring, &Json::Null);
        assert_eq!(score, 5.0);
    }

    #[test]
    fn normalize_rescales_and_clamps() {
        let mut checks = HashMap::new();
        checks.insert("a".to_string(), passed(true));
        let scoring = ScoringConfig {
            normalize: true,
            min_score: 0.0,
            max_score: 2.0,
            ..Default::default()
        };
        let score = compute_score(&checks, &scoring, &Json::Null);
        assert_eq!(score, 0.5);
    }

    #[test]
    fn formula_can_reference_env_state() {
        let checks: HashMap<String, CheckResult> = HashMap::new();
        let scoring = ScoringConfig {
            formula: Some("env_state.balance".to_string()),
            ..Default::default()
        };
        let env_state = json!({"balance": 900.01});
        let score = compute_score(&checks, &scoring, &env_state);
        assert_eq!(score, 900.01);
    }

    #[test]
    fn empty_vector_scores_zero() {
        let checks: HashMap<String, CheckResult> = HashMap::new();
        let score = compute_score(&checks, &ScoringConfig::default(), &Json::Null);
        assert_eq!(score, 0.0);
    }
}
