//! The `Tool` contract every built-in and mock tool implements.

use serde_json::Value;

/// Schema for one action a tool exposes, surfaced to an agent as part
/// of its available-tools listing.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ActionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

/// Outcome of one `Tool::invoke` call.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self { success: true, data, error: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self { success: false, data: Value::Null, error: Some(error.into()) }
    }
}

/// A tool instance bound to one session. `env_state` is the module's
/// shared environment state: tools read it for context and may
/// mutate it (e.g. `refund_order` decrementing `cash_balance`).
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn invoke(&self, action: &str, args: &Value, env_state: &mut Value) -> ToolResult;

    fn actions(&self) -> Vec<ActionSpec>;
}
