//! An `Agent` whose turns are typed at the terminal, for manually
//! driving a session with no model backend attached. `Agent::step` is
//! synchronous by contract (`simcore-engine::agent::Agent`), so each
//! call blocks on a line of stdin — acceptable for `simcore session`,
//! which owns its runtime and drives exactly one session at a time.

use std::io::{self, Write};

use simcore_engine::{Agent, AgentAction, PublishedTool};
use simcore_types::Message;

#[derive(Default)]
pub struct TerminalAgent;

impl TerminalAgent {
    pub fn new() -> Self {
        Self
    }
}

impl Agent for TerminalAgent {
    fn step(
        &mut self,
        _history: &[Message],
        published_tools: &[PublishedTool],
    ) -> Result<AgentAction, simcore_engine::Error> {
        if published_tools.is_empty() {
            print!("agent> ");
        } else {
            let names: Vec<&str> = published_tools.iter().map(|t| t.name.as_str()).collect();
            print!("agent (tools: {}, or 'tool: <name> <action> <json args>')> ", names.join(", "));
        }
        io::stdout().flush().ok();

        let mut line = String::new();
        if io::stdin().read_line(&mut line).unwrap_or(0) == 0 {
            return Ok(AgentAction::Stop);
        }
        let line = line.trim();

        if line.is_empty() || line.eq_ignore_ascii_case("stop") {
            return Ok(AgentAction::Stop);
        }

        if let Some(rest) = line.strip_prefix("tool:") {
            let mut parts = rest.trim().splitn(3, ' ');
            let tool_name = parts.next().unwrap_or_default().to_string();
            let tool_action = parts.next().unwrap_or_default().to_string();
            let tool_args = parts
                .next()
                .and_then(|raw| serde_json::from_str(raw).ok())
                .unwrap_or(serde_json::Value::Null);
            return Ok(AgentAction::ToolCall {
                tool_name,
                tool_action,
                tool_args,
                tool_call_id: None,
            });
        }

        Ok(AgentAction::Message { content: line.to_string() })
    }
}
