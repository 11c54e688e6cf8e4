//! An `Agent` driven by a JSON file of pre-recorded turns, for
//! replaying a deterministic run or session without a live model
//! attached. Distinct from `simcore-testing::ScriptedAgent`, which is
//! built from in-process values for unit tests; this one parses from
//! disk for `simcore run --agent-script`/`simcore session --agent-script`.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use simcore_engine::{Agent, AgentAction, PublishedTool};
use simcore_types::Message;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ScriptedTurn {
    Message {
        content: String,
    },
    ToolCall {
        tool: String,
        action: String,
        #[serde(default)]
        args: serde_json::Value,
        #[serde(default)]
        call_id: Option<String>,
    },
    Stop,
}

impl From<ScriptedTurn> for AgentAction {
    fn from(turn: ScriptedTurn) -> Self {
        match turn {
            ScriptedTurn::Message { content } => AgentAction::Message { content },
            ScriptedTurn::ToolCall { tool, action, args, call_id } => AgentAction::ToolCall {
                tool_name: tool,
                tool_action: action,
                tool_args: args,
                tool_call_id: call_id,
            },
            ScriptedTurn::Stop => AgentAction::Stop,
        }
    }
}

pub struct FileScriptedAgent {
    actions: VecDeque<AgentAction>,
}

impl FileScriptedAgent {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading agent script {}", path.display()))?;
        let turns: Vec<ScriptedTurn> = serde_json::from_str(&text)
            .with_context(|| format!("parsing agent script {}", path.display()))?;
        Ok(Self { actions: turns.into_iter().map(AgentAction::from).collect() })
    }

    /// An agent with nothing queued — its first turn is always `Stop`.
    pub fn stops_immediately() -> Self {
        Self { actions: VecDeque::new() }
    }
}

impl Agent for FileScriptedAgent {
    fn step(
        &mut self,
        _history: &[Message],
        _published_tools: &[PublishedTool],
    ) -> Result<AgentAction, simcore_engine::Error> {
        Ok(self.actions.pop_front().unwrap_or(AgentAction::Stop))
    }
}
