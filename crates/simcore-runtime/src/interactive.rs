//! Interactive (suspendable) executor (C6): the same step machine as
//! `simcore-engine::executor`, but able to suspend at `await_user` and
//! accept out-of-band commands while live. Runs as one tokio task per
//! session; the event stream is consumed by pulling from a bounded
//! channel, matching `spec.md` §5's backpressure requirement.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use simcore_engine::{Agent, AgentAction, PublishedTool};
use simcore_tools::{Tool, ToolResult};
use simcore_types::{
    EventKind, Message, Module, SessionEvent, SessionState, Step, StepAction,
    ToolCall as MsgToolCall,
};
use tokio::sync::{mpsc, oneshot, Mutex as AsyncMutex};

use crate::error::{Error, Result};

/// Out-of-band operations a `SessionHandle` can send to a live session
/// task. `ProvideInput` is not a variant here — it rendezvouses
/// directly through `pending_input`, matching the one-shot-future
/// shape of the original `asyncio.Future`-based implementation.
#[derive(Debug)]
pub enum Command {
    InjectEvent {
        tool_name: String,
        event_type: String,
        args: Value,
        reply: oneshot::Sender<Result<Value>>,
    },
    Pause,
    Resume,
    Cancel,
}

/// Handle to a live interactive session. Dropping this does not cancel
/// the underlying task; call `cancel` explicitly. `&self` methods only
/// (including event consumption) so a `SessionManager` can share one
/// handle behind an `Arc` without holding a table-wide lock across a
/// session's own blocking operations.
pub struct SessionHandle {
    events: AsyncMutex<mpsc::Receiver<SessionEvent>>,
    commands: mpsc::Sender<Command>,
    pending_input: Arc<Mutex<Option<oneshot::Sender<String>>>>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionHandle {
    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    /// Pulls the next event off the session's stream, or `None` once
    /// the session has closed its channel (after `completed`/`error`).
    pub async fn recv_event(&self) -> Option<SessionEvent> {
        self.events.lock().await.recv().await
    }

    /// Resolves a pending `await_user` suspension. Fails with
    /// `BadState` if the session isn't currently awaiting input.
    pub fn provide_input(&self, content: impl Into<String>) -> Result<()> {
        let mut slot = self.pending_input.lock().unwrap();
        match slot.take() {
            Some(tx) => {
                let _ = tx.send(content.into());
                Ok(())
            }
            None => Err(Error::BadState(
                "session is not awaiting_user".to_string(),
            )),
        }
    }

    /// Invokes `tool_name`'s `trigger_event` action with
    /// `{event: event_type, ...args}`, synchronously from the caller's
    /// perspective (awaits the task's reply before returning).
    pub async fn inject_event(
        &self,
        tool_name: impl Into<String>,
        event_type: impl Into<String>,
        args: Value,
    ) -> Result<Value> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::InjectEvent {
                tool_name: tool_name.into(),
                event_type: event_type.into(),
                args,
                reply,
            })
            .await
            .map_err(|_| Error::NotFound("session task has ended".to_string()))?;
        reply_rx
            .await
            .map_err(|_| Error::NotFound("session task has ended".to_string()))?
    }

    pub async fn pause(&self) -> Result<()> {
        self.commands
            .send(Command::Pause)
            .await
            .map_err(|_| Error::NotFound("session task has ended".to_string()))
    }

    pub async fn resume(&self) -> Result<()> {
        self.commands
            .send(Command::Resume)
            .await
            .map_err(|_| Error::NotFound("session task has ended".to_string()))
    }

    pub async fn cancel(&self) -> Result<()> {
        self.commands
            .send(Command::Cancel)
            .await
            .map_err(|_| Error::NotFound("session task has ended".to_string()))
    }
}

const EVENT_CHANNEL_CAPACITY: usize = 32;
const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Spawns a module run as a tokio task, returning a handle to drive and
/// observe it. `max_tool_calls` bounds the agent↔tool sub-loop the same
/// way it does in the synchronous executor.
pub fn spawn(
    module: Arc<Module>,
    agent: Box<dyn Agent>,
    tools: HashMap<String, Arc<dyn Tool>>,
    max_tool_calls: usize,
) -> SessionHandle {
    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let pending_input = Arc::new(Mutex::new(None));
    let state = Arc::new(Mutex::new(SessionState::Idle));

    let task_pending_input = pending_input.clone();
    let task_state = state.clone();

    tokio::spawn(run(
        module,
        agent,
        tools,
        max_tool_calls,
        events_tx,
        commands_rx,
        task_pending_input,
        task_state,
    ));

    SessionHandle {
        events: AsyncMutex::new(events_rx),
        commands: commands_tx,
        pending_input,
        state,
    }
}

struct RunState {
    agent: Box<dyn Agent>,
    tools: HashMap<String, Arc<dyn Tool>>,
    max_tool_calls: usize,
    history: Vec<Message>,
    events: Vec<SessionEvent>,
    env_state: Value,
}

async fn run(
    module: Arc<Module>,
    agent: Box<dyn Agent>,
    tools: HashMap<String, Arc<dyn Tool>>,
    max_tool_calls: usize,
    events_tx: mpsc::Sender<SessionEvent>,
    mut commands_rx: mpsc::Receiver<Command>,
    pending_input: Arc<Mutex<Option<oneshot::Sender<String>>>>,
    state: Arc<Mutex<SessionState>>,
) {
    *state.lock().unwrap() = SessionState::Running;

    let mut rs = RunState {
        agent,
        tools,
        max_tool_calls,
        history: Vec::new(),
        events: Vec::new(),
        env_state: module.environment.initial_state.clone(),
    };

    let mut steps: &[Step] = &module.steps;
    let mut index = 0usize;
    let mut retried_after_tool = false;
    let mut paused = false;

    'outer: loop {
        while let Ok(cmd) = commands_rx.try_recv() {
            if !handle_side_command(cmd, &mut rs, &mut paused).await {
                emit_cancelled(&events_tx, &state).await;
                return;
            }
        }

        if paused {
            *state.lock().unwrap() = SessionState::Paused;
            match commands_rx.recv().await {
                Some(Command::Resume) => {
                    paused = false;
                    *state.lock().unwrap() = SessionState::Running;
                    continue;
                }
                Some(cmd) => {
                    if !handle_side_command(cmd, &mut rs, &mut paused).await {
                        emit_cancelled(&events_tx, &state).await;
                        return;
                    }
                    continue;
                }
                None => return,
            }
        }

        if index >= steps.len() {
            break 'outer;
        }

        let step = steps[index].clone();

        match &step.action {
            StepAction::InjectUser => handle_inject_user(&mut rs, &step, &events_tx).await,
            StepAction::AwaitUser => {
                *state.lock().unwrap() = SessionState::AwaitingUser;
                let ok = handle_await_user(&mut rs, &step, &events_tx, &pending_input, &mut commands_rx).await;
                if !ok {
                    emit_cancelled(&events_tx, &state).await;
                    return;
                }
                *state.lock().unwrap() = SessionState::Running;
            }
            StepAction::AwaitAgent => {
                *state.lock().unwrap() = SessionState::AwaitingAgent;
                handle_await_agent(&mut rs, &step, &events_tx, &mut retried_after_tool).await;
                *state.lock().unwrap() = SessionState::Running;
            }
            StepAction::Branch => {
                let branch_name = step
                    .params
                    .get("branch_name")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let event = SessionEvent::new(
                    EventKind::Branch,
                    serde_json::json!({"branch": branch_name, "step_id": step.id}),
                );
                rs.events.push(event.clone());
                let _ = events_tx.send(event).await;

                if let Some(name) = &branch_name
                    && let Some(new_steps) = module.branches.get(name)
                {
                    steps = new_steps;
                    index = 0;
                    continue;
                }
            }
            StepAction::ToolCall => handle_direct_tool_call(&mut rs, &step, &events_tx).await,
            StepAction::Unknown(action) => {
                let _ = events_tx
                    .send(SessionEvent::new(
                        EventKind::Error,
                        serde_json::json!({"message": format!("step {} has unrecognized action {action:?}", step.id)}),
                    ))
                    .await;
                *state.lock().unwrap() = SessionState::Error;
                return;
            }
        }

        index += 1;
    }

    let evaluation = simcore_engine::evaluate(&module, &rs.history, &rs.events, &rs.env_state);
    *state.lock().unwrap() = SessionState::Completed;
    let _ = events_tx
        .send(SessionEvent::new(
            EventKind::Completed,
            serde_json::json!({"evaluation": evaluation, "num_events": rs.events.len()}),
        ))
        .await;
}

async fn emit_cancelled(events_tx: &mpsc::Sender<SessionEvent>, state: &Mutex<SessionState>) {
    *state.lock().unwrap() = SessionState::Error;
    let _ = events_tx
        .send(SessionEvent::new(
            EventKind::Error,
            serde_json::json!({"message": "session cancelled"}),
        ))
        .await;
}

/// Processes a command that isn't resolved through `pending_input`.
/// Returns `false` if the session was cancelled and the caller should
/// stop.
async fn handle_side_command(cmd: Command, rs: &mut RunState, paused: &mut bool) -> bool {
    match cmd {
        Command::Pause => {
            *paused = true;
            true
        }
        Command::Resume => {
            *paused = false;
            true
        }
        Command::Cancel => false,
        Command::InjectEvent {
            tool_name,
            event_type,
            args,
            reply,
        } => {
            let result = invoke_trigger_event(rs, &tool_name, &event_type, args);
            let _ = reply.send(result);
            true
        }
    }
}

fn invoke_trigger_event(
    rs: &mut RunState,
    tool_name: &str,
    event_type: &str,
    args: Value,
) -> Result<Value> {
    let tool = rs
        .tools
        .get(tool_name)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("tool not found: {tool_name}")))?;

    let mut event_args = match args {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    event_args.insert("event".to_string(), Value::String(event_type.to_string()));

    let result = tool.invoke("trigger_event", &Value::Object(event_args), &mut rs.env_state);
    if result.success {
        Ok(result.data)
    } else {
        Err(Error::BadState(format!(
            "event trigger failed: {}",
            result.error.unwrap_or_default()
        )))
    }
}

async fn handle_inject_user(rs: &mut RunState, step: &Step, events_tx: &mpsc::Sender<SessionEvent>) {
    let content = param_str(&step.params, "content");
    rs.history.push(Message::user(content.clone()));
    let event = SessionEvent::new(
        EventKind::User,
        serde_json::json!({"content": content, "step_id": step.id, "scripted": true}),
    );
    rs.events.push(event.clone());
    let _ = events_tx.send(event).await;
}

async fn handle_await_user(
    rs: &mut RunState,
    step: &Step,
    events_tx: &mpsc::Sender<SessionEvent>,
    pending_input: &Arc<Mutex<Option<oneshot::Sender<String>>>>,
    commands_rx: &mut mpsc::Receiver<Command>,
) -> bool {
    let prompt = param_str(&step.params, "prompt");
    let timeout_secs = step.params.get("timeout").and_then(Value::as_f64);
    let default_content = step
        .params
        .get("default")
        .and_then(Value::as_str)
        .unwrap_or("[timeout - no input]")
        .to_string();

    let awaiting = SessionEvent::new(
        EventKind::AwaitingInput,
        serde_json::json!({"prompt": prompt, "step_id": step.id, "timeout": timeout_secs}),
    );
    rs.events.push(awaiting.clone());
    let _ = events_tx.send(awaiting).await;

    let (tx, rx) = oneshot::channel();
    *pending_input.lock().unwrap() = Some(tx);
    tokio::pin!(rx);

    let sleep = async {
        match timeout_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs_f64(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(sleep);

    let content = loop {
        tokio::select! {
            res = &mut rx => {
                break res.unwrap_or_else(|_| default_content.clone());
            }
            _ = &mut sleep => {
                break default_content.clone();
            }
            cmd = commands_rx.recv() => {
                match cmd {
                    Some(Command::Cancel) | None => {
                        pending_input.lock().unwrap().take();
                        return false;
                    }
                    Some(other) => {
                        let mut paused = false;
                        handle_side_command(other, rs, &mut paused).await;
                    }
                }
            }
        }
    };
    pending_input.lock().unwrap().take();

    rs.history.push(Message::user(content.clone()));
    let event = SessionEvent::new(
        EventKind::User,
        serde_json::json!({"content": content, "step_id": step.id, "scripted": false}),
    );
    rs.events.push(event.clone());
    let _ = events_tx.send(event).await;
    true
}

async fn handle_await_agent(
    rs: &mut RunState,
    step: &Step,
    events_tx: &mpsc::Sender<SessionEvent>,
    retried_after_tool: &mut bool,
) {
    let mut tool_call_count = 0usize;

    while tool_call_count < rs.max_tool_calls {
        let published = published_tools(rs);
        let action = match rs.agent.step(&rs.history, &published) {
            Ok(action) => action,
            Err(e) => {
                let content = format!("[agent error: {e}]");
                rs.history.push(Message::assistant(content.clone()));
                let event = SessionEvent::new(
                    EventKind::Agent,
                    serde_json::json!({"content": content, "step_id": step.id, "error": true}),
                );
                rs.events.push(event.clone());
                let _ = events_tx.send(event).await;
                return;
            }
        };

        match action {
            AgentAction::Message { content } => {
                rs.history.push(Message::assistant(content.clone()));
                let event = SessionEvent::new(
                    EventKind::Agent,
                    serde_json::json!({"content": content, "step_id": step.id}),
                );
                rs.events.push(event.clone());
                let _ = events_tx.send(event).await;
                return;
            }
            AgentAction::ToolCall {
                tool_name,
                tool_action,
                tool_args,
                tool_call_id,
            } => {
                handle_tool_call_from_agent(rs, step, tool_name, tool_action, tool_args, tool_call_id, events_tx)
                    .await;
                tool_call_count += 1;
            }
            AgentAction::Stop => {
                if tool_call_count > 0 && !*retried_after_tool {
                    *retried_after_tool = true;
                    rs.history.push(Message::user(
                        "[System: Please respond based on the information you just retrieved.]",
                    ));
                    continue;
                }
                let event = SessionEvent::new(
                    EventKind::AgentStop,
                    serde_json::json!({"step_id": step.id}),
                );
                rs.events.push(event.clone());
                let _ = events_tx.send(event).await;
                return;
            }
        }
    }
}

async fn handle_tool_call_from_agent(
    rs: &mut RunState,
    step: &Step,
    tool_name: String,
    tool_action: String,
    tool_args: Value,
    tool_call_id: Option<String>,
    events_tx: &mpsc::Sender<SessionEvent>,
) {
    let tool_call_id =
        tool_call_id.unwrap_or_else(|| format!("call_{tool_name}_{tool_action}_{}", rs.events.len()));
    let function_name = simcore_tools::wire::encode(&tool_name, &tool_action);

    let call_event = SessionEvent::new(
        EventKind::ToolCall,
        serde_json::json!({"tool": tool_name, "action": tool_action, "args": tool_args, "step_id": step.id}),
    );
    rs.events.push(call_event.clone());
    let _ = events_tx.send(call_event).await;

    rs.history.push(Message::assistant_tool_calls(vec![MsgToolCall {
        id: tool_call_id.clone(),
        name: function_name,
        arguments: tool_args.to_string(),
    }]));

    let (result_event, history_message) = match rs.tools.get(&tool_name).cloned() {
        Some(tool) => {
            let result: ToolResult = tool.invoke(&tool_action, &tool_args, &mut rs.env_state);
            let content = if result.success {
                result.data.to_string()
            } else {
                result.error.clone().unwrap_or_default()
            };
            let event = SessionEvent::new(
                EventKind::ToolResult,
                serde_json::json!({"tool": tool_name, "action": tool_action, "result": result}),
            );
            (event, Message::tool_result(tool_name, tool_call_id, content))
        }
        None => {
            let error_msg = format!("Tool not found: {tool_name}");
            let event = SessionEvent::new(
                EventKind::ToolResult,
                serde_json::json!({"tool": tool_name, "action": tool_action, "result": {"success": false, "error": error_msg}}),
            );
            (event, Message::tool_result(tool_name, tool_call_id, error_msg))
        }
    };

    rs.events.push(result_event.clone());
    let _ = events_tx.send(result_event).await;
    rs.history.push(history_message);
}

async fn handle_direct_tool_call(rs: &mut RunState, step: &Step, events_tx: &mpsc::Sender<SessionEvent>) {
    let tool_name = param_str(&step.params, "tool");
    let tool_action = param_str(&step.params, "action");
    let tool_args = step
        .params
        .get("args")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));

    let call_event = SessionEvent::new(
        EventKind::ToolCall,
        serde_json::json!({"tool": tool_name, "action": tool_action, "args": tool_args, "step_id": step.id, "direct": true}),
    );
    rs.events.push(call_event.clone());
    let _ = events_tx.send(call_event).await;

    let result_event = match rs.tools.get(&tool_name).cloned() {
        Some(tool) => {
            let result = tool.invoke(&tool_action, &tool_args, &mut rs.env_state);
            SessionEvent::new(
                EventKind::ToolResult,
                serde_json::json!({"tool": tool_name, "action": tool_action, "result": result}),
            )
        }
        None => SessionEvent::new(
            EventKind::ToolResult,
            serde_json::json!({"tool": tool_name, "action": tool_action, "result": {"success": false, "error": format!("Tool not found: {tool_name}")}}),
        ),
    };
    rs.events.push(result_event.clone());
    let _ = events_tx.send(result_event).await;
}

fn published_tools(rs: &RunState) -> Vec<PublishedTool> {
    rs.tools
        .iter()
        .map(|(name, tool)| PublishedTool {
            name: name.clone(),
            description: String::new(),
            actions: tool.actions(),
        })
        .collect()
}

fn param_str(params: &HashMap<String, Value>, key: &str) -> String {
    params.get(key).and_then(Value::as_str).unwrap_or("").to_string()
}
