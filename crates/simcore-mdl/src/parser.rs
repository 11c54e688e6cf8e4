//! YAML module loader and structural validator. Parsing never fails on
//! unrecognized step actions, evaluation kinds, or dangling branch
//! references — those are reported by `validate`, which runs on an
//! already-loaded `Module` and returns diagnostics instead of erroring.

use crate::error::{Error, Result};
use simcore_types::{Module, StepAction};

/// Parses a YAML module document into a `Module`.
///
/// Fails only on malformed YAML, a non-mapping root, or a missing
/// `id` field — everything else downstream of those three checks is
/// `validate`'s job, not the loader's.
pub fn parse_module(text: &str) -> Result<Module> {
    let yaml_value: serde_yaml::Value = serde_yaml::from_str(text)?;

    if !matches!(yaml_value, serde_yaml::Value::Mapping(_)) {
        return Err(Error::Parse("module must be a YAML mapping".to_string()));
    }

    let mut json_value = serde_json::to_value(&yaml_value)
        .map_err(|e| Error::Parse(format!("could not normalize YAML to JSON: {e}")))?;

    let obj = json_value
        .as_object_mut()
        .ok_or_else(|| Error::Parse("module must be a YAML mapping".to_string()))?;

    if !obj.contains_key("id") {
        return Err(Error::Parse("module must have an 'id' field".to_string()));
    }

    // `agent_config` with fallback to the legacy `agent` key.
    if !obj.contains_key("agent_config") {
        if let Some(legacy) = obj.remove("agent") {
            obj.insert("agent_config".to_string(), legacy);
        }
    }

    serde_json::from_value(json_value).map_err(|e| Error::Parse(e.to_string()))
}

/// Structural issues `validate` can find without running the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    UnknownStepAction { step_id: String, action: String },
    DanglingBranch { step_id: String, branch_name: String },
    UnknownEvaluationKind { check_name: String, kind: String },
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationIssue::UnknownStepAction { step_id, action } => {
                write!(f, "step '{step_id}' has unknown action '{action}'")
            }
            ValidationIssue::DanglingBranch { step_id, branch_name } => {
                write!(f, "step '{step_id}' references unknown branch '{branch_name}'")
            }
            ValidationIssue::UnknownEvaluationKind { check_name, kind } => {
                write!(f, "evaluation check '{check_name}' has unknown kind '{kind}'")
            }
        }
    }
}

/// Reports structural problems without raising. Steps with unknown
/// actions and checks with unrecognized kinds are only flagged here —
/// `CheckKind`'s `#[serde(tag = "kind")]` already rejects unknown kinds
/// at parse time for the *resolved* evaluation list, so in practice
/// this only fires for `StepAction::Unknown` and dangling branches;
/// kept as its own pass so loader and validator stay decoupled, per
/// the component split.
pub fn validate(module: &Module) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let check_steps = |steps: &[simcore_types::Step], issues: &mut Vec<ValidationIssue>| {
        for step in steps {
            if let StepAction::Unknown(action) = &step.action {
                issues.push(ValidationIssue::UnknownStepAction {
                    step_id: step.id.clone(),
                    action: action.clone(),
                });
            }
            if step.action == StepAction::Branch {
                if let Some(branch_name) = step.params.get("branch_name").and_then(|v| v.as_str()) {
                    if !module.branches.contains_key(branch_name) {
                        issues.push(ValidationIssue::DanglingBranch {
                            step_id: step.id.clone(),
                            branch_name: branch_name.to_string(),
                        });
                    }
                }
            }
        }
    };

    check_steps(&module.steps, &mut issues);
    for branch_steps in module.branches.values() {
        check_steps(branch_steps, &mut issues);
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
id: greet
steps:
  - id: s1
    action: inject_user
    params:
      text: hello
"#;

    #[test]
    fn parses_minimal_module() {
        let module = parse_module(MINIMAL).unwrap();
        assert_eq!(module.id, "greet");
        assert_eq!(module.steps.len(), 1);
    }

    #[test]
    fn rejects_missing_id() {
        let err = parse_module("steps: []").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn rejects_non_mapping_root() {
        let err = parse_module("- 1\n- 2").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn falls_back_to_legacy_agent_key() {
        let text = r#"
id: m
agent:
  name: legacy-agent
  model: gpt
"#;
        let module = parse_module(text).unwrap();
        assert_eq!(module.agent_config.name, "legacy-agent");
    }

    #[test]
    fn validate_reports_unknown_action_without_raising() {
        let text = r#"
id: m
steps:
  - id: s1
    action: frobnicate
"#;
        let module = parse_module(text).unwrap();
        let issues = validate(&module);
        assert_eq!(
            issues,
            vec![ValidationIssue::UnknownStepAction {
                step_id: "s1".to_string(),
                action: "frobnicate".to_string(),
            }]
        );
    }

    #[test]
    fn validate_reports_dangling_branch_reference() {
        let text = r#"
id: m
steps:
  - id: s1
    action: branch
    params:
      branch_name: missing
"#;
        let module = parse_module(text).unwrap();
        let issues = validate(&module);
        assert_eq!(
            issues,
            vec![ValidationIssue::DanglingBranch {
                step_id: "s1".to_string(),
                branch_name: "missing".to_string(),
            }]
        );
    }
}
