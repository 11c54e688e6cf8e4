use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One record in a session's ordered transcript.
///
/// `events` is append-only and monotonically ordered — Invariant 1.
/// `payload` is a loosely-typed JSON object rather than a per-kind
/// struct because the payload shape is part of the external wire
/// contract (`spec.md` §3, §6) and downstream consumers (evaluator,
/// transport) pattern-match on it by convention, the way the original
/// `RunEvent` does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default)]
    pub payload: Value,
}

impl SessionEvent {
    pub fn new(kind: EventKind, payload: Value) -> Self {
        Self { kind, payload }
    }
}

/// The kind of a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    User,
    Agent,
    AgentStop,
    ToolCall,
    ToolResult,
    Branch,
    AwaitingInput,
    Completed,
    Error,
}

/// Lifecycle state of an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    AwaitingUser,
    AwaitingAgent,
    Paused,
    Completed,
    Error,
}
