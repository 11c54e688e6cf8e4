//! End-to-end runs of the literal session scenarios: parse, bind,
//! build tools, execute, and score, in one pipeline.

use simcore_engine::{AgentAction, Executor};
use simcore_testing::{ScriptedAgent, TestWorld};
use simcore_tools::ToolCatalog;
use simcore_types::EventKind;

fn build_tool_map(
    module: &simcore_types::Module,
) -> std::collections::HashMap<String, std::sync::Arc<dyn simcore_tools::Tool>> {
    let catalog = ToolCatalog::empty();
    let built = simcore_tools::build_tools(&module.environment.tools, &catalog).unwrap();
    built.into_iter().map(|tool| (tool.name().to_string(), tool)).collect()
}

#[test]
fn s1_refund_happy_path() {
    let world = TestWorld::new();
    world.write_module(
        "refund_basic",
        r#"
id: refund_basic
environment:
  tools:
    - name: shopify
      type: mock_shopify
      config:
        initial_orders:
          ORD123:
            id: ORD123
            status: Delivered
            refunded: false
            total: 99.99
  initial_state:
    cash_balance: 1000.0
steps:
  - id: s1
    action: inject_user
    params:
      content: "Please refund ORD123"
  - id: s2
    action: await_agent
evaluation:
  - name: tool_called
    kind: tool_called
    tool: shopify
    action: refund_order
  - name: cash_balance
    kind: env_state
    key: cash_balance
    value: 900.01
"#,
    );
    let module = world.load_module("refund_basic");
    let tools = build_tool_map(&module);

    let mut agent = ScriptedAgent::new([
        AgentAction::ToolCall {
            tool_name: "shopify".to_string(),
            tool_action: "refund_order".to_string(),
            tool_args: serde_json::json!({"order_id": "ORD123"}),
            tool_call_id: None,
        },
        AgentAction::Message { content: "Refunded".to_string() },
    ]);

    let (history, events, env_state) = Executor::new(&module, &mut agent, tools).run().unwrap();

    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::User,
            EventKind::ToolCall,
            EventKind::ToolResult,
            EventKind::Agent,
        ]
    );
    assert_eq!(env_state["cash_balance"], serde_json::json!(900.01));

    let result = simcore_engine::evaluate(&module, &history, &events, &env_state);
    assert_eq!(result.score, 1.0);
}

#[test]
fn s2_branch_selection_skips_unreached_linear_step() {
    let world = TestWorld::new();
    world.write_module(
        "escalation",
        r#"
id: escalation
steps:
  - id: s1
    action: inject_user
    params:
      content: hi
  - id: s2
    action: branch
    params:
      branch_name: esc
  - id: s3
    action: inject_user
    params:
      content: unreached
branches:
  esc:
    - id: b1
      action: inject_user
      params:
        content: escalated
    - id: b2
      action: await_agent
"#,
    );
    let module = world.load_module("escalation");
    let tools = build_tool_map(&module);
    let mut agent = ScriptedAgent::message("ok");

    let (history, events, _env_state) = Executor::new(&module, &mut agent, tools).run().unwrap();

    let contents: Vec<String> = history.iter().map(|m| m.content.clone()).collect();
    assert_eq!(contents, vec!["hi", "escalated", "ok"]);
    assert!(!contents.iter().any(|c| c == "unreached"));

    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![EventKind::User, EventKind::Branch, EventKind::User, EventKind::Agent]
    );
}

#[test]
fn s3_tool_call_sub_loop_caps_at_ten_with_no_agent_message() {
    let world = TestWorld::new();
    world.write_module(
        "looping_agent",
        r#"
id: looping_agent
environment:
  tools:
    - name: shopify
      type: mock_shopify
steps:
  - id: s1
    action: await_agent
"#,
    );
    let module = world.load_module("looping_agent");
    let tools = build_tool_map(&module);

    let call = AgentAction::ToolCall {
        tool_name: "shopify".to_string(),
        tool_action: "list_orders".to_string(),
        tool_args: serde_json::json!({}),
        tool_call_id: None,
    };
    let mut agent = ScriptedAgent::new(std::iter::repeat(call).take(50));

    let (_history, events, _env_state) = Executor::new(&module, &mut agent, tools).run().unwrap();

    let tool_calls = events.iter().filter(|e| e.kind == EventKind::ToolCall).count();
    let tool_results = events.iter().filter(|e| e.kind == EventKind::ToolResult).count();
    assert_eq!(tool_calls, 10);
    assert_eq!(tool_results, 10);
    assert!(!events.iter().any(|e| e.kind == EventKind::Agent));
}

#[test]
fn s5_scoring_formula_combines_named_checks() {
    let world = TestWorld::new();
    world.write_module(
        "scored",
        r#"
id: scored
steps:
  - id: s1
    action: inject_user
    params:
      content: "A B C"
evaluation:
  - name: A
    kind: contains
    target: user_messages
    value: A
  - name: B
    kind: contains
    target: user_messages
    value: zzz
  - name: C
    kind: contains
    target: user_messages
    value: C
scoring:
  formula: "A*2 + B + C*3"
"#,
    );
    let module = world.load_module("scored");
    let tools = build_tool_map(&module);
    let mut agent = ScriptedAgent::new([]);

    let (history, events, env_state) = Executor::new(&module, &mut agent, tools).run().unwrap();
    let result = simcore_engine::evaluate(&module, &history, &events, &env_state);
    assert_eq!(result.score, 5.0);
}

#[test]
fn s6_conditional_step_elided_with_default_binding_present_with_override() {
    let world = TestWorld::new();
    world.write_module(
        "difficulty",
        r#"
id: difficulty
variables:
  - name: mode
    type: string
    default: easy
steps:
  - id: s1
    action: inject_user
    condition: 'mode == "hard"'
    params:
      content: "brace yourself"
  - id: s2
    action: inject_user
    params:
      content: always
"#,
    );

    let parse = |yaml: &str| simcore_mdl::parse_module(yaml).unwrap();
    let text = std::fs::read_to_string(world.modules_dir().join("difficulty.yaml")).unwrap();
    let raw = parse(&text);

    let easy = simcore_mdl::bind(&raw, &serde_json::Map::new());
    assert_eq!(easy.steps.len(), 1);
    assert_eq!(easy.steps[0].params["content"], "always");

    let mut bindings = serde_json::Map::new();
    bindings.insert("mode".to_string(), serde_json::json!("hard"));
    let hard = simcore_mdl::bind(&raw, &bindings);
    assert_eq!(hard.steps.len(), 2);
    assert_eq!(hard.steps[0].params["content"], "brace yourself");
}
