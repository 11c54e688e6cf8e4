//! Session Manager (C8): mints session ids, owns the in-memory map from
//! id to a live interactive session, and exposes the operations a
//! transport layer would call. This crate has no transport of its own —
//! see `spec.md`'s Non-goals — so the manager is the whole surface a
//! future HTTP/WebSocket layer would wrap.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use simcore_engine::Agent;
use simcore_tools::Tool;
use simcore_types::{Module, SessionEvent, SessionState};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::interactive::{self, SessionHandle};

/// In-memory registry of live interactive sessions, keyed by a freshly
/// minted v4 UUID. Each lookup clones an `Arc` out from behind the
/// table lock and releases it immediately, so one session blocked in
/// `recv_event` or `inject_event` never stalls operations on another.
#[derive(Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, Arc<SessionHandle>>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Mints a new session id and spawns its task. The session starts
    /// running immediately; callers that want the first batch of events
    /// should poll `recv_event` right away.
    pub async fn create(
        &self,
        module: Arc<Module>,
        agent: Box<dyn Agent>,
        tools: HashMap<String, Arc<dyn Tool>>,
        max_tool_calls: usize,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let handle = interactive::spawn(module, agent, tools, max_tool_calls);
        self.sessions.lock().await.insert(id.clone(), Arc::new(handle));
        id
    }

    async fn lookup(&self, id: &str) -> Result<Arc<SessionHandle>> {
        self.sessions
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    pub async fn state(&self, id: &str) -> Result<SessionState> {
        Ok(self.lookup(id).await?.state())
    }

    /// Pulls the next event off a session's stream, or `None` once the
    /// session has closed its channel (after `completed`/`error`).
    pub async fn recv_event(&self, id: &str) -> Result<Option<SessionEvent>> {
        Ok(self.lookup(id).await?.recv_event().await)
    }

    pub async fn provide_input(&self, id: &str, content: impl Into<String>) -> Result<()> {
        self.lookup(id).await?.provide_input(content)
    }

    pub async fn inject_event(
        &self,
        id: &str,
        tool_name: impl Into<String>,
        event_type: impl Into<String>,
        args: Value,
    ) -> Result<Value> {
        self.lookup(id).await?.inject_event(tool_name, event_type, args).await
    }

    pub async fn pause(&self, id: &str) -> Result<()> {
        self.lookup(id).await?.pause().await
    }

    pub async fn resume(&self, id: &str) -> Result<()> {
        self.lookup(id).await?.resume().await
    }

    /// Cancels a live session (if any) and drops it from the map.
    /// Deleting an id that is already gone is not an error — matches
    /// the original runner's idempotent teardown.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let handle = self.sessions.lock().await.remove(id);
        if let Some(handle) = handle {
            let _ = handle.cancel().await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore_testing::ScriptedAgent;
    use simcore_types::{AgentConfig, EventKind, Environment, Step, StepAction};
    use std::collections::HashMap as Map;

    fn module_with_one_await() -> Arc<Module> {
        Arc::new(Module {
            id: "m".to_string(),
            description: String::new(),
            variables: vec![],
            agent_config: AgentConfig::default(),
            environment: Environment::default(),
            steps: vec![Step {
                id: "s1".to_string(),
                action: StepAction::AwaitUser,
                params: Map::from([("prompt".to_string(), Value::String("hi?".to_string()))]),
                condition: None,
            }],
            branches: Default::default(),
            evaluation: vec![],
            scoring: Default::default(),
        })
    }

    #[tokio::test]
    async fn create_and_recv_then_provide_input_completes_session() {
        let manager = SessionManager::new();
        let agent = Box::new(ScriptedAgent::new(Vec::new()));
        let id = manager.create(module_with_one_await(), agent, Map::new(), 10).await;

        let first = manager.recv_event(&id).await.unwrap().unwrap();
        assert_eq!(first.kind, EventKind::AwaitingInput);
        assert_eq!(manager.state(&id).await.unwrap(), SessionState::AwaitingUser);

        manager.provide_input(&id, "Ada").await.unwrap();

        let second = manager.recv_event(&id).await.unwrap().unwrap();
        assert_eq!(second.payload["content"], "Ada");

        let completed = manager.recv_event(&id).await.unwrap().unwrap();
        assert_eq!(completed.kind, EventKind::Completed);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let manager = SessionManager::new();
        assert!(matches!(manager.state("missing").await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let manager = SessionManager::new();
        let agent = Box::new(ScriptedAgent::new(Vec::new()));
        let id = manager.create(module_with_one_await(), agent, Map::new(), 10).await;
        manager.delete(&id).await.unwrap();
        manager.delete(&id).await.unwrap();
    }
}
