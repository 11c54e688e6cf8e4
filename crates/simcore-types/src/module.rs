use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Kind of a declared module variable; drives both form generation and
/// template binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    String,
    Number,
    Boolean,
    Select,
    Slider,
}

/// One option of a `select`-kind variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableOption {
    pub value: String,
    pub label: String,
}

/// A variable a module exposes for binding. Unbound, it carries its
/// `default`; bound, the caller's value replaces it in the variable map
/// the binder builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default = "default_variable_kind")]
    pub kind: VariableKind,
    #[serde(default)]
    pub default: Value,
    #[serde(default)]
    pub options: Option<Vec<VariableOption>>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
}

fn default_variable_kind() -> VariableKind {
    VariableKind::String
}

impl Variable {
    /// Label as shown to a form renderer: explicit `label`, or the raw
    /// variable name when none was given.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Reference to a tool in a module's `environment.tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolRef {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub config: Value,
}

/// Environment configuration for a module: which sandbox, which tools,
/// and the state every tool and the evaluator see and mutate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default = "default_sandbox_type")]
    pub sandbox_type: String,
    #[serde(default)]
    pub tools: Vec<ToolRef>,
    #[serde(default)]
    pub initial_state: Value,
}

fn default_sandbox_type() -> String {
    "local".to_string()
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            sandbox_type: default_sandbox_type(),
            tools: Vec::new(),
            initial_state: Value::Object(Default::default()),
        }
    }
}

/// The action a step performs. An unknown action string fails to parse
/// at validation time rather than being silently skipped at run time —
/// see `spec.md` §9, "the executor must refuse to start on an unknown
/// action".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    InjectUser,
    AwaitUser,
    AwaitAgent,
    Branch,
    ToolCall,
    /// An action string the validator does not recognize. Kept rather
    /// than rejected at parse time — `spec.md` §4.1: "the validator does
    /// not type-check params; param shape is enforced at interpretation
    /// time", and unknown actions are reported by `validate`, not raised
    /// by the loader.
    Unknown(String),
}

impl StepAction {
    pub fn as_str(&self) -> &str {
        match self {
            StepAction::InjectUser => "inject_user",
            StepAction::AwaitUser => "await_user",
            StepAction::AwaitAgent => "await_agent",
            StepAction::Branch => "branch",
            StepAction::ToolCall => "tool_call",
            StepAction::Unknown(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, StepAction::Unknown(_))
    }
}

impl From<&str> for StepAction {
    fn from(s: &str) -> Self {
        match s {
            "inject_user" => StepAction::InjectUser,
            "await_user" => StepAction::AwaitUser,
            "await_agent" => StepAction::AwaitAgent,
            "branch" => StepAction::Branch,
            "tool_call" => StepAction::ToolCall,
            other => StepAction::Unknown(other.to_string()),
        }
    }
}

impl Serialize for StepAction {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StepAction {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(StepAction::from(s.as_str()))
    }
}

/// One unit of scripted control flow. `condition` is stripped from a
/// bound module — see Invariant 5.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub action: StepAction,
    #[serde(default)]
    pub params: HashMap<String, Value>,
    #[serde(default)]
    pub condition: Option<String>,
}

/// Agent configuration carried by a module, read from `agent_config` or
/// (for backward compatibility) `agent`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub impl_config: Value,
}

/// The complete, possibly-unbound specification for one module.
///
/// Immutable after binding: `Binder::bind` consumes a reference and
/// produces a fresh `Module` with conditions resolved and templates
/// interpolated, rather than mutating in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
    #[serde(default)]
    pub agent_config: AgentConfig,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub branches: HashMap<String, Vec<Step>>,
    #[serde(default)]
    pub evaluation: Vec<super::evaluation::EvaluationCheck>,
    #[serde(default)]
    pub scoring: super::evaluation::ScoringConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_action_round_trips_known_variants() {
        for action in [
            StepAction::InjectUser,
            StepAction::AwaitUser,
            StepAction::AwaitAgent,
            StepAction::Branch,
            StepAction::ToolCall,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            let back: StepAction = serde_json::from_str(&json).unwrap();
            assert_eq!(action, back);
        }
    }

    #[test]
    fn step_action_preserves_unknown_strings() {
        let action: StepAction = serde_json::from_str("\"frobnicate\"").unwrap();
        assert_eq!(action, StepAction::Unknown("frobnicate".to_string()));
        assert!(!action.is_known());
        assert_eq!(action.as_str(), "frobnicate");
    }

    #[test]
    fn variable_display_label_falls_back_to_name() {
        let v = Variable {
            name: "mode".to_string(),
            label: None,
            description: String::new(),
            kind: VariableKind::String,
            default: Value::String("easy".to_string()),
            options: None,
            min: None,
            max: None,
            step: None,
        };
        assert_eq!(v.display_label(), "mode");
    }
}
