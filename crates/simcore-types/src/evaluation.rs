use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An accessor target for message-shaped evaluation checks.
///
/// `equals` additionally accepts `env.<dotted>`, which is not a variant
/// here — it is parsed out by the evaluator (`CheckTarget::parse`) since
/// the dotted suffix is open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckTarget {
    AgentMessages,
    UserMessages,
    AllMessages,
    LastAgentMessage,
    LastUserMessage,
    ToolCalls,
}

/// One evaluation check, tagged by `kind`. Unknown kinds are not
/// representable here (the loader keeps the raw `kind` string and
/// `config` map for anything it doesn't recognize, see
/// `RawEvaluationCheck` in `simcore-mdl`) — this type is the *resolved*
/// shape the evaluator actually runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckKind {
    Contains {
        target: CheckTarget,
        value: String,
        #[serde(default = "default_true")]
        expected: bool,
        #[serde(default)]
        case_sensitive: bool,
    },
    Regex {
        target: CheckTarget,
        pattern: String,
        #[serde(default = "default_true")]
        expected: bool,
        #[serde(default)]
        case_sensitive: bool,
    },
    Count {
        target: CheckTarget,
        #[serde(default)]
        min: Option<usize>,
        #[serde(default)]
        max: Option<usize>,
    },
    ToolCalled {
        tool: String,
        #[serde(default)]
        action: Option<String>,
        #[serde(default = "default_true")]
        expected: bool,
    },
    Equals {
        /// Either a `CheckTarget` name or `env.<dotted.path>`.
        target: String,
        value: Value,
    },
    EnvState {
        key: String,
        value: Value,
    },
    Deterministic {
        expr: String,
        #[serde(default)]
        pass_if: Option<String>,
    },
    Llm {
        #[serde(default)]
        config: Value,
    },
}

fn default_true() -> bool {
    true
}

/// One named evaluation check as it appears in a module document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationCheck {
    pub name: String,
    #[serde(flatten)]
    pub kind: CheckKind,
}

/// Scoring configuration: either a custom formula over check names, or
/// a weighted average, optionally renormalized to `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    #[serde(default)]
    pub normalize: bool,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_max_score")]
    pub max_score: f64,
}

fn default_min_score() -> f64 {
    0.0
}

fn default_max_score() -> f64 {
    1.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            formula: None,
            weights: HashMap::new(),
            normalize: false,
            min_score: default_min_score(),
            max_score: default_max_score(),
        }
    }
}

/// Result of one check, as the evaluator records it in `EvaluationResult.checks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckResult {
    /// The common pass/fail shape most check kinds produce, plus
    /// whatever extra diagnostic fields that kind attaches.
    Passed {
        passed: bool,
        #[serde(flatten)]
        extra: Value,
    },
    /// A `deterministic` check with no `pass_if`: just the numeric
    /// value, no verdict.
    Value { value: Value },
    /// `llm` checks, and anything the core cannot compute.
    Skipped { status: String, reason: String },
    /// A check that raised during evaluation.
    Error { status: String, error: String },
}

/// Final output of a module evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EvaluationResult {
    pub checks: HashMap<String, CheckResult>,
    pub score: f64,
    pub num_events: usize,
    pub status: String,
}
