//! Rule-based evaluator (C7): runs every check in a bound module's
//! `evaluation` list against a completed session, then scores the
//! result.

use std::collections::{BTreeMap, HashMap};

use regex::RegexBuilder;
use serde_json::Value as Json;
use simcore_types::{
    CheckKind, CheckResult, EvaluationCheck, EvaluationResult, Message, Module, SessionEvent,
};

use crate::accessor::{self, EqualsTarget};
use crate::scoring::compute_score;

/// Runs every check in `module.evaluation` against `history`/`events`/
/// `env_state`, then computes the final score per `module.scoring`.
pub fn evaluate(
    module: &Module,
    history: &[Message],
    events: &[SessionEvent],
    env_state: &Json,
) -> EvaluationResult {
    let mut checks = HashMap::new();
    for check in &module.evaluation {
        let result = run_check(check, history, events, env_state);
        checks.insert(check.name.clone(), result);
    }

    let score = compute_score(&checks, &module.scoring, env_state);

    EvaluationResult {
        checks,
        score,
        num_events: events.len(),
        status: "ok".to_string(),
    }
}

fn run_check(
    check: &EvaluationCheck,
    history: &[Message],
    events: &[SessionEvent],
    env_state: &Json,
) -> CheckResult {
    match &check.kind {
        CheckKind::Contains {
            target,
            value,
            expected,
            case_sensitive,
        } => {
            let haystack = accessor::resolve_text(target, history);
            let found = if *case_sensitive {
                haystack.contains(value.as_str())
            } else {
                haystack.to_lowercase().contains(&value.to_lowercase())
            };
            CheckResult::Passed {
                passed: found == *expected,
                extra: serde_json::json!({"found": found}),
            }
        }
        CheckKind::Regex {
            target,
            pattern,
            expected,
            case_sensitive,
        } => {
            let haystack = accessor::resolve_text(target, history);
            match RegexBuilder::new(pattern)
                .case_insensitive(!case_sensitive)
                .build()
            {
                Ok(re) => {
                    let found = re.is_match(&haystack);
                    CheckResult::Passed {
                        passed: found == *expected,
                        extra: serde_json::json!({"found": found}),
                    }
                }
                Err(e) => CheckResult::Error {
                    status: "error".to_string(),
                    error: e.to_string(),
                },
            }
        }
        CheckKind::Count { target, min, max } => {
            let len = accessor::resolve_len(target, history, events);
            let ok_min = min.is_none_or(|m| len >= m);
            let ok_max = max.is_none_or(|m| len <= m);
            CheckResult::Passed {
                passed: ok_min && ok_max,
                extra: serde_json::json!({"count": len}),
            }
        }
        CheckKind::ToolCalled {
            tool,
            action,
            expected,
        } => {
            let found = accessor::tool_call_events(events).iter().any(|event| {
                let matches_tool = event.payload.get("tool").and_then(Json::as_str) == Some(tool);
                let matches_action = action.as_deref().is_none_or(|expected_action| {
                    event.payload.get("action").and_then(Json::as_str) == Some(expected_action)
                });
                matches_tool && matches_action
            });
            CheckResult::Passed {
                passed: found == *expected,
                extra: serde_json::json!({"found": found}),
            }
        }
        CheckKind::Equals { target, value } => match EqualsTarget::parse(target) {
            Some(EqualsTarget::Message(check_target)) => {
                let actual = accessor::resolve_text(&check_target, history);
                let matches = value.as_str() == Some(actual.as_str());
                CheckResult::Passed {
                    passed: matches,
                    extra: serde_json::json!({"actual": actual}),
                }
            }
            Some(EqualsTarget::Env(path)) => {
                let actual = accessor::dotted_get(env_state, &path).cloned();
                let matches = actual.as_ref() == Some(value);
                CheckResult::Passed {
                    passed: matches,
                    extra: serde_json::json!({"actual": actual}),
                }
            }
            None => CheckResult::Error {
                status: "error".to_string(),
                error: format!("unresolvable equals target: {target}"),
            },
        },
        CheckKind::EnvState { key, value } => {
            let actual = accessor::dotted_get(env_state, key).cloned();
            let matches = actual.as_ref() == Some(value);
            CheckResult::Passed {
                passed: matches,
                extra: serde_json::json!({"actual": actual}),
            }
        }
        CheckKind::Deterministic { expr, pass_if } => {
            run_deterministic(expr, pass_if.as_deref(), history, events, env_state)
        }
        CheckKind::Llm { .. } => CheckResult::Skipped {
            status: "skipped".to_string(),
            reason: "LLM eval not implemented".to_string(),
        },
    }
}

fn run_deterministic(
    expr: &str,
    pass_if: Option<&str>,
    history: &[Message],
    events: &[SessionEvent],
    env_state: &Json,
) -> CheckResult {
    let mut vars: BTreeMap<String, simcore_expr::Value> = BTreeMap::new();
    vars.insert("env_state".to_string(), simcore_expr::Value::from(env_state));
    vars.insert(
        "history".to_string(),
        simcore_expr::Value::from(&history_to_json(history)),
    );
    vars.insert(
        "events".to_string(),
        simcore_expr::Value::from(&events_to_json(events)),
    );

    let value = match simcore_expr::eval_str(expr, &vars) {
        Ok(v) => v,
        Err(e) => {
            return CheckResult::Error {
                status: "error".to_string(),
                error: e.to_string(),
            }
        }
    };

    match pass_if {
        Some(condition) => match value.as_f64() {
            Some(n) => CheckResult::Passed {
                passed: simcore_expr::pass_condition::passes(condition, n),
                extra: serde_json::json!({"value": Json::from(value)}),
            },
            None => CheckResult::Error {
                status: "error".to_string(),
                error: "deterministic expr with pass_if must evaluate to a number".to_string(),
            },
        },
        None => CheckResult::Value {
            value: Json::from(value),
        },
    }
}

fn history_to_json(history: &[Message]) -> Json {
    serde_json::to_value(history).unwrap_or(Json::Array(Vec::new()))
}

fn events_to_json(events: &[SessionEvent]) -> Json {
    serde_json::to_value(events).unwrap_or(Json::Array(Vec::new()))
}
