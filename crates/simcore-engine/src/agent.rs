//! The `Agent` contract: a function from conversation history and the
//! currently published tool schemas to the next action.

use simcore_tools::ActionSpec;

/// One tool's published schema, as an agent sees it. `name` here is
/// the tool instance name, distinct from `environment.tools[].type`.
#[derive(Debug, Clone)]
pub struct PublishedTool {
    pub name: String,
    pub description: String,
    pub actions: Vec<ActionSpec>,
}

/// The action an `Agent` returns from one `step` call.
#[derive(Debug, Clone)]
pub enum AgentAction {
    Message { content: String },
    ToolCall {
        tool_name: String,
        tool_action: String,
        tool_args: serde_json::Value,
        tool_call_id: Option<String>,
    },
    Stop,
}

/// An agent as the executor sees it: given the conversation so far and
/// the tools currently published, decide the next action. Agents are
/// external collaborators (an LLM-backed implementation, a scripted
/// test double) — this crate only defines the seam.
pub trait Agent: Send + Sync {
    fn step(
        &mut self,
        history: &[simcore_types::Message],
        published_tools: &[PublishedTool],
    ) -> Result<AgentAction, crate::error::Error>;
}
