//! A deterministic `Agent` driven by a pre-programmed queue of actions,
//! for reproducibility assertions and the literal session scenarios.

use std::collections::VecDeque;

use simcore_engine::{Agent, AgentAction, PublishedTool};
use simcore_types::Message;

/// Returns each queued action in order, falling back to `Stop` once
/// the queue is exhausted.
pub struct ScriptedAgent {
    actions: VecDeque<AgentAction>,
}

impl ScriptedAgent {
    pub fn new(actions: impl IntoIterator<Item = AgentAction>) -> Self {
        Self { actions: actions.into_iter().collect() }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self::new([AgentAction::Message { content: content.into() }])
    }
}

impl Agent for ScriptedAgent {
    fn step(
        &mut self,
        _history: &[Message],
        _published_tools: &[PublishedTool],
    ) -> Result<AgentAction, simcore_engine::Error> {
        Ok(self.actions.pop_front().unwrap_or(AgentAction::Stop))
    }
}
