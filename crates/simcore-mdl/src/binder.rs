//! Variable binding: resolves a module's declared `variables` against
//! caller-supplied bindings, then interpolates every template string
//! and filters every conditional step the module carries. Produces a
//! fresh, already-bound `Module` — nothing downstream needs to know a
//! binder ever ran.

use simcore_types::{AgentConfig, Environment, Module, Step, ToolRef};
use std::collections::BTreeMap;

/// Builds the flat variable map a binder run uses throughout:
/// declared defaults, then caller bindings layered on top.
fn build_var_dict(
    module: &Module,
    bindings: &serde_json::Map<String, serde_json::Value>,
) -> BTreeMap<String, simcore_expr::Value> {
    let mut vars: BTreeMap<String, simcore_expr::Value> = module
        .variables
        .iter()
        .map(|v| (v.name.clone(), simcore_expr::Value::from(&v.default)))
        .collect();

    for (name, value) in bindings {
        vars.insert(name.clone(), simcore_expr::Value::from(value));
    }

    vars
}

/// Binds `module` against `bindings`, returning a new `Module` with
/// templates interpolated and condition-filtered steps resolved.
/// `condition` is cleared on every surviving step (Invariant: a bound
/// module carries no unresolved conditions).
pub fn bind(module: &Module, bindings: &serde_json::Map<String, serde_json::Value>) -> Module {
    let vars = build_var_dict(module, bindings);

    let agent_config = AgentConfig {
        system_prompt: crate::template::interpolate_str(&module.agent_config.system_prompt, &vars),
        ..module.agent_config.clone()
    };

    let environment = Environment {
        tools: module
            .environment
            .tools
            .iter()
            .map(|tool| ToolRef {
                config: crate::template::interpolate_value(&tool.config, &vars),
                ..tool.clone()
            })
            .collect(),
        initial_state: crate::template::interpolate_value(&module.environment.initial_state, &vars),
        ..module.environment.clone()
    };

    let steps = bind_steps(&module.steps, &vars);
    let branches = module
        .branches
        .iter()
        .map(|(name, steps)| (name.clone(), bind_steps(steps, &vars)))
        .collect();

    Module {
        id: module.id.clone(),
        description: module.description.clone(),
        variables: module.variables.clone(),
        agent_config,
        environment,
        steps,
        branches,
        evaluation: module.evaluation.clone(),
        scoring: module.scoring.clone(),
    }
}

fn bind_steps(steps: &[Step], vars: &BTreeMap<String, simcore_expr::Value>) -> Vec<Step> {
    steps
        .iter()
        .filter(|step| match &step.condition {
            Some(cond) => crate::template::eval_condition(cond, vars),
            None => true,
        })
        .map(|step| Step {
            id: step.id.clone(),
            action: step.action.clone(),
            params: step
                .params
                .iter()
                .map(|(k, v)| (k.clone(), crate::template::interpolate_value(v, vars)))
                .collect(),
            condition: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_module;

    #[test]
    fn binds_defaults_and_drops_false_conditions() {
        let text = r#"
id: m
variables:
  - name: tier
    type: string
    default: silver
steps:
  - id: s1
    action: inject_user
    params:
      text: "hello {{tier}} customer"
  - id: s2
    action: inject_user
    condition: 'tier == "gold"'
    params:
      text: upsell
"#;
        let module = parse_module(text).unwrap();
        let bound = bind(&module, &serde_json::Map::new());
        assert_eq!(bound.steps.len(), 1);
        assert_eq!(bound.steps[0].params["text"], "hello silver customer");
        assert!(bound.steps[0].condition.is_none());
    }

    #[test]
    fn caller_bindings_override_defaults() {
        let text = r#"
id: m
variables:
  - name: tier
    type: string
    default: silver
steps:
  - id: s1
    action: inject_user
    condition: 'tier == "gold"'
    params:
      text: upsell
"#;
        let module = parse_module(text).unwrap();
        let mut bindings = serde_json::Map::new();
        bindings.insert("tier".to_string(), serde_json::Value::String("gold".to_string()));
        let bound = bind(&module, &bindings);
        assert_eq!(bound.steps.len(), 1);
    }

    #[test]
    fn whole_placeholder_param_preserves_numeric_type() {
        let text = r#"
id: m
variables:
  - name: amount
    type: number
    default: 10
steps:
  - id: s1
    action: tool_call
    params:
      amount: "{{amount}}"
"#;
        let module = parse_module(text).unwrap();
        let bound = bind(&module, &serde_json::Map::new());
        assert_eq!(bound.steps[0].params["amount"], serde_json::json!(10.0));
    }

    #[test]
    fn branches_are_interpolated_and_filtered_same_as_steps() {
        let text = r#"
id: m
variables:
  - name: tier
    type: string
    default: silver
branches:
  upsell_path:
    - id: b1
      action: inject_user
      condition: 'tier == "gold"'
      params:
        text: vip
    - id: b2
      action: inject_user
      params:
        text: "hi {{tier}}"
"#;
        let module = parse_module(text).unwrap();
        let bound = bind(&module, &serde_json::Map::new());
        let branch = &bound.branches["upsell_path"];
        assert_eq!(branch.len(), 1);
        assert_eq!(branch[0].params["text"], "hi silver");
    }
}
