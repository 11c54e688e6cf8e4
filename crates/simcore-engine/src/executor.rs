//! Synchronous executor (C5): walks a bound module's step sequence to
//! completion in one call. `await_user` has no meaning here — a module
//! that reaches it fails with `ExecutorFatal`; use
//! `simcore-runtime`'s interactive executor for sessions that need to
//! suspend.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use simcore_tools::Tool;
use simcore_types::{Message, Module, SessionEvent, Step, StepAction, ToolCall as MsgToolCall};
use tracing::instrument;

use crate::agent::{Agent, AgentAction, PublishedTool};
use crate::error::{Error, Result};

pub const DEFAULT_MAX_TOOL_CALLS: usize = 10;

/// Runs a bound module's steps against one agent and one set of
/// constructed tools, accumulating a session transcript and mutating
/// `env_state` as tools are invoked.
pub struct Executor<'a> {
    module: &'a Module,
    agent: &'a mut dyn Agent,
    tools: HashMap<String, Arc<dyn Tool>>,
    max_tool_calls: usize,
    history: Vec<Message>,
    events: Vec<SessionEvent>,
    env_state: Value,
}

impl<'a> Executor<'a> {
    pub fn new(
        module: &'a Module,
        agent: &'a mut dyn Agent,
        tools: HashMap<String, Arc<dyn Tool>>,
    ) -> Self {
        Self {
            env_state: module.environment.initial_state.clone(),
            module,
            agent,
            tools,
            max_tool_calls: DEFAULT_MAX_TOOL_CALLS,
            history: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: usize) -> Self {
        self.max_tool_calls = max_tool_calls;
        self
    }

    /// Runs the module to completion, returning the accumulated event
    /// transcript and the final `env_state`. The caller is responsible
    /// for running the evaluator over the result.
    #[instrument(skip(self), fields(module_id = %self.module.id))]
    pub fn run(mut self) -> Result<(Vec<Message>, Vec<SessionEvent>, Value)> {
        let module = self.module;
        let mut steps: &'a [Step] = &module.steps;
        let mut index = 0usize;
        let mut retried_after_tool = false;

        while index < steps.len() {
            let step = &steps[index];

            match &step.action {
                StepAction::InjectUser => self.handle_inject_user(step),
                StepAction::AwaitUser => {
                    return Err(Error::ExecutorFatal(format!(
                        "step {} is await_user, which the synchronous executor cannot suspend on",
                        step.id
                    )));
                }
                StepAction::AwaitAgent => {
                    self.handle_await_agent(step, &mut retried_after_tool)?
                }
                StepAction::Branch => {
                    let (event, new_steps) = self.handle_branch(module, step);
                    self.events.push(event);
                    if let Some(new_steps) = new_steps {
                        steps = new_steps;
                        index = 0;
                        continue;
                    }
                }
                StepAction::ToolCall => self.handle_direct_tool_call(step),
                StepAction::Unknown(action) => {
                    return Err(Error::ExecutorFatal(format!(
                        "step {} has unrecognized action {action:?}",
                        step.id
                    )));
                }
            }

            index += 1;
        }

        Ok((self.history, self.events, self.env_state))
    }

    fn handle_inject_user(&mut self, step: &Step) {
        let content = param_str(&step.params, "content");
        self.history.push(Message::user(content.clone()));
        self.events.push(SessionEvent::new(
            simcore_types::EventKind::User,
            serde_json::json!({"content": content, "step_id": step.id, "scripted": true}),
        ));
    }

    fn handle_await_agent(&mut self, step: &Step, retried_after_tool: &mut bool) -> Result<()> {
        let mut tool_call_count = 0usize;

        while tool_call_count < self.max_tool_calls {
            let published = self.published_tools();
            let action = match self.agent.step(&self.history, &published) {
                Ok(action) => action,
                Err(e) => {
                    let content = format!("[agent error: {e}]");
                    self.history.push(Message::assistant(content.clone()));
                    self.events.push(SessionEvent::new(
                        simcore_types::EventKind::Agent,
                        serde_json::json!({"content": content, "step_id": step.id, "error": true}),
                    ));
                    return Ok(());
                }
            };

            match action {
                AgentAction::Message { content } => {
                    self.history.push(Message::assistant(content.clone()));
                    self.events.push(SessionEvent::new(
                        simcore_types::EventKind::Agent,
                        serde_json::json!({"content": content, "step_id": step.id}),
                    ));
                    return Ok(());
                }
                AgentAction::ToolCall {
                    tool_name,
                    tool_action,
                    tool_args,
                    tool_call_id,
                } => {
                    self.handle_tool_call_from_agent(
                        step,
                        tool_name,
                        tool_action,
                        tool_args,
                        tool_call_id,
                    );
                    tool_call_count += 1;
                }
                AgentAction::Stop => {
                    if tool_call_count > 0 && !*retried_after_tool {
                        *retried_after_tool = true;
                        self.history.push(Message::user(
                            "[System: Please respond based on the information you just retrieved.]",
                        ));
                        continue;
                    }
                    self.events.push(SessionEvent::new(
                        simcore_types::EventKind::AgentStop,
                        serde_json::json!({"step_id": step.id}),
                    ));
                    return Ok(());
                }
            }
        }

        // Cap reached: sub-loop exits silently, same as the original —
        // no closing agent message, session stays runnable.
        Ok(())
    }

    fn handle_tool_call_from_agent(
        &mut self,
        step: &Step,
        tool_name: String,
        tool_action: String,
        tool_args: Value,
        tool_call_id: Option<String>,
    ) {
        let tool_call_id = tool_call_id
            .unwrap_or_else(|| format!("call_{tool_name}_{tool_action}_{}", self.events.len()));
        let function_name = simcore_tools::wire::encode(&tool_name, &tool_action);

        self.events.push(SessionEvent::new(
            simcore_types::EventKind::ToolCall,
            serde_json::json!({
                "tool": tool_name,
                "action": tool_action,
                "args": tool_args,
                "step_id": step.id,
            }),
        ));

        self.history.push(Message::assistant_tool_calls(vec![MsgToolCall {
            id: tool_call_id.clone(),
            name: function_name,
            arguments: tool_args.to_string(),
        }]));

        match self.tools.get(&tool_name).cloned() {
            Some(tool) => {
                let result = tool.invoke(&tool_action, &tool_args, &mut self.env_state);
                self.events.push(SessionEvent::new(
                    simcore_types::EventKind::ToolResult,
                    serde_json::json!({
                        "tool": tool_name,
                        "action": tool_action,
                        "result": result,
                    }),
                ));

                let content = if result.success {
                    result.data.to_string()
                } else {
                    result.error.clone().unwrap_or_default()
                };
                self.history
                    .push(Message::tool_result(tool_name, tool_call_id, content));
            }
            None => {
                let error_msg = format!("Tool not found: {tool_name}");
                self.events.push(SessionEvent::new(
                    simcore_types::EventKind::ToolResult,
                    serde_json::json!({
                        "tool": tool_name,
                        "action": tool_action,
                        "result": {"success": false, "error": error_msg},
                    }),
                ));
                self.history
                    .push(Message::tool_result(tool_name, tool_call_id, error_msg));
            }
        }
    }

    fn handle_direct_tool_call(&mut self, step: &Step) {
        let tool_name = param_str(&step.params, "tool");
        let tool_action = param_str(&step.params, "action");
        let tool_args = step
            .params
            .get("args")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        self.events.push(SessionEvent::new(
            simcore_types::EventKind::ToolCall,
            serde_json::json!({
                "tool": tool_name,
                "action": tool_action,
                "args": tool_args,
                "step_id": step.id,
                "direct": true,
            }),
        ));

        match self.tools.get(&tool_name).cloned() {
            Some(tool) => {
                let result = tool.invoke(&tool_action, &tool_args, &mut self.env_state);
                self.events.push(SessionEvent::new(
                    simcore_types::EventKind::ToolResult,
                    serde_json::json!({"tool": tool_name, "action": tool_action, "result": result}),
                ));
            }
            None => {
                self.events.push(SessionEvent::new(
                    simcore_types::EventKind::ToolResult,
                    serde_json::json!({
                        "tool": tool_name,
                        "action": tool_action,
                        "result": {"success": false, "error": format!("Tool not found: {tool_name}")},
                    }),
                ));
            }
        }
    }

    fn handle_branch<'m>(
        &self,
        module: &'m Module,
        step: &Step,
    ) -> (SessionEvent, Option<&'m [Step]>) {
        let branch_name = step.params.get("branch_name").and_then(Value::as_str);

        let event = SessionEvent::new(
            simcore_types::EventKind::Branch,
            serde_json::json!({"branch": branch_name, "step_id": step.id}),
        );

        let new_steps = branch_name.and_then(|name| module.branches.get(name)).map(Vec::as_slice);
        (event, new_steps)
    }

    fn published_tools(&self) -> Vec<PublishedTool> {
        self.module
            .environment
            .tools
            .iter()
            .map(|tool_ref| {
                let actions = self
                    .tools
                    .get(&tool_ref.name)
                    .map(|tool| tool.actions())
                    .unwrap_or_default();
                PublishedTool {
                    name: tool_ref.name.clone(),
                    description: tool_ref.description.clone(),
                    actions,
                }
            })
            .collect()
    }
}

fn param_str(params: &HashMap<String, Value>, key: &str) -> String {
    params
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore_tools::{ActionSpec, ToolResult};
    use simcore_types::{AgentConfig, Environment, ToolRef};
    use std::sync::Mutex;

    struct StubAgent {
        actions: Mutex<Vec<AgentAction>>,
    }

    impl StubAgent {
        fn new(actions: Vec<AgentAction>) -> Self {
            Self {
                actions: Mutex::new(actions),
            }
        }
    }

    impl Agent for StubAgent {
        fn step(
            &mut self,
            _history: &[Message],
            _published_tools: &[PublishedTool],
        ) -> Result<AgentAction> {
            let mut actions = self.actions.lock().unwrap();
            if actions.is_empty() {
                Ok(AgentAction::Stop)
            } else {
                Ok(actions.remove(0))
            }
        }
    }

    struct FailingAgent;

    impl Agent for FailingAgent {
        fn step(
            &mut self,
            _history: &[Message],
            _published_tools: &[PublishedTool],
        ) -> Result<AgentAction> {
            Err(Error::AgentFailure("agent exploded".to_string()))
        }
    }

    struct EchoTool;

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn invoke(&self, _action: &str, args: &Value, _env_state: &mut Value) -> ToolResult {
            ToolResult::ok(args.clone())
        }

        fn actions(&self) -> Vec<ActionSpec> {
            vec![ActionSpec {
                name: "say".to_string(),
                description: "echoes input".to_string(),
                parameters: serde_json::json!({}),
            }]
        }
    }

    fn module_with_steps(steps: Vec<Step>) -> Module {
        Module {
            id: "m".to_string(),
            description: String::new(),
            variables: vec![],
            agent_config: AgentConfig::default(),
            environment: Environment::default(),
            steps,
            branches: Default::default(),
            evaluation: vec![],
            scoring: Default::default(),
        }
    }

    fn inject_user(id: &str, content: &str) -> Step {
        Step {
            id: id.to_string(),
            action: StepAction::InjectUser,
            params: HashMap::from([("content".to_string(), Value::String(content.to_string()))]),
            condition: None,
        }
    }

    fn await_agent(id: &str) -> Step {
        Step {
            id: id.to_string(),
            action: StepAction::AwaitAgent,
            params: HashMap::new(),
            condition: None,
        }
    }

    #[test]
    fn inject_user_then_agent_message_produces_expected_events() {
        let module = module_with_steps(vec![inject_user("s1", "hi"), await_agent("s2")]);
        let mut agent = StubAgent::new(vec![AgentAction::Message {
            content: "ok".to_string(),
        }]);
        let exec = Executor::new(&module, &mut agent, HashMap::new());
        let (_, events, _) = exec.run().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, simcore_types::EventKind::User);
        assert_eq!(events[1].kind, simcore_types::EventKind::Agent);
        assert_eq!(events[1].payload["content"], "ok");
    }

    #[test]
    fn branch_replaces_remaining_steps() {
        let mut module = module_with_steps(vec![
            inject_user("s1", "hi"),
            Step {
                id: "s2".to_string(),
                action: StepAction::Branch,
                params: HashMap::from([(
                    "branch_name".to_string(),
                    Value::String("esc".to_string()),
                )]),
                condition: None,
            },
            inject_user("s3", "unreached"),
        ]);
        module
            .branches
            .insert("esc".to_string(), vec![inject_user("b1", "escalated"), await_agent("b2")]);

        let mut agent = StubAgent::new(vec![AgentAction::Message {
            content: "ok".to_string(),
        }]);
        let exec = Executor::new(&module, &mut agent, HashMap::new());
        let (_, events, _) = exec.run().unwrap();

        let contents: Vec<String> = events
            .iter()
            .filter_map(|e| e.payload.get("content").and_then(|v| v.as_str()))
            .map(String::from)
            .collect();
        assert_eq!(contents, vec!["hi", "escalated", "ok"]);
        assert!(!contents.iter().any(|c| c == "unreached"));
    }

    #[test]
    fn tool_call_sub_loop_stops_at_cap_with_no_agent_message() {
        let module = module_with_steps(vec![await_agent("s1")]);
        let repeated_call = AgentAction::ToolCall {
            tool_name: "echo".to_string(),
            tool_action: "say".to_string(),
            tool_args: serde_json::json!({}),
            tool_call_id: None,
        };
        let mut agent = StubAgent::new(std::iter::repeat(repeated_call).take(20).collect());
        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();
        tools.insert("echo".to_string(), Arc::new(EchoTool));

        let exec = Executor::new(&module, &mut agent, tools).with_max_tool_calls(10);
        let (_, events, _) = exec.run().unwrap();

        let tool_call_events = events
            .iter()
            .filter(|e| e.kind == simcore_types::EventKind::ToolCall)
            .count();
        assert_eq!(tool_call_events, 10);
        assert!(!events.iter().any(|e| e.kind == simcore_types::EventKind::Agent));
    }

    #[test]
    fn agent_failure_emits_message_event_and_session_continues() {
        let module = module_with_steps(vec![await_agent("s1"), inject_user("s2", "after")]);
        let mut agent = FailingAgent;
        let exec = Executor::new(&module, &mut agent, HashMap::new());
        let (history, events, _) = exec.run().unwrap();

        assert_eq!(events[0].kind, simcore_types::EventKind::Agent);
        assert_eq!(events[0].payload["error"], true);
        assert!(events[0].payload["content"].as_str().unwrap().contains("agent exploded"));
        assert_eq!(events[1].kind, simcore_types::EventKind::User);
        assert!(history.iter().any(|m| m.content.contains("agent exploded")));
    }

    #[test]
    fn await_user_step_is_fatal() {
        let module = module_with_steps(vec![Step {
            id: "s1".to_string(),
            action: StepAction::AwaitUser,
            params: HashMap::new(),
            condition: None,
        }]);
        let mut agent = StubAgent::new(vec![]);
        let exec = Executor::new(&module, &mut agent, HashMap::new());
        assert!(matches!(exec.run(), Err(Error::ExecutorFatal(_))));
    }

    #[test]
    fn direct_tool_call_step_reads_tool_action_args_params() {
        let module = module_with_steps(vec![Step {
            id: "s1".to_string(),
            action: StepAction::ToolCall,
            params: HashMap::from([
                ("tool".to_string(), Value::String("echo".to_string())),
                ("action".to_string(), Value::String("say".to_string())),
                ("args".to_string(), serde_json::json!({"x": 1})),
            ]),
            condition: None,
        }]);
        let mut agent = StubAgent::new(vec![]);
        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();
        tools.insert("echo".to_string(), Arc::new(EchoTool));

        let exec = Executor::new(&module, &mut agent, tools);
        let (_, events, _) = exec.run().unwrap();

        assert_eq!(events[0].kind, simcore_types::EventKind::ToolCall);
        assert_eq!(events[0].payload["direct"], true);
        assert_eq!(events[1].payload["result"]["data"]["x"], 1);
    }
}
