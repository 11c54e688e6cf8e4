//! Structural assertions over a session transcript.

use std::collections::HashSet;

use anyhow::{bail, Result};
use simcore_types::{EventKind, Message, Role, SessionEvent};

/// Invariant 2: every `tool_call` event is immediately followed by its
/// `tool_result`.
pub fn assert_tool_call_immediately_followed_by_result(events: &[SessionEvent]) -> Result<()> {
    for (i, event) in events.iter().enumerate() {
        if event.kind != EventKind::ToolCall {
            continue;
        }
        match events.get(i + 1) {
            Some(next) if next.kind == EventKind::ToolResult => {}
            Some(next) => bail!(
                "tool_call at index {i} followed by {:?}, expected tool_result",
                next.kind
            ),
            None => bail!("tool_call at index {i} is the last event, expected a following tool_result"),
        }
    }
    Ok(())
}

/// Invariant 3: every assistant `tool_calls[]` entry has a matching
/// `tool` message before the next `assistant` message.
pub fn assert_tool_calls_resolved_before_next_assistant(history: &[Message]) -> Result<()> {
    let mut pending: HashSet<String> = HashSet::new();

    for msg in history {
        match msg.role {
            Role::Assistant => {
                if !pending.is_empty() {
                    bail!(
                        "assistant message arrived with {} tool_call(s) still unresolved",
                        pending.len()
                    );
                }
                if let Some(calls) = &msg.tool_calls {
                    for call in calls {
                        pending.insert(call.id.clone());
                    }
                }
            }
            Role::Tool => {
                let Some(id) = &msg.tool_call_id else {
                    bail!("tool message has no tool_call_id");
                };
                if !pending.remove(id) {
                    bail!("tool message resolves unknown tool_call_id {id}");
                }
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore_types::ToolCall;

    #[test]
    fn accepts_well_formed_tool_call_pair() {
        let events = vec![
            SessionEvent::new(EventKind::ToolCall, serde_json::json!({})),
            SessionEvent::new(EventKind::ToolResult, serde_json::json!({})),
        ];
        assert!(assert_tool_call_immediately_followed_by_result(&events).is_ok());
    }

    #[test]
    fn rejects_tool_call_not_immediately_resolved() {
        let events = vec![
            SessionEvent::new(EventKind::ToolCall, serde_json::json!({})),
            SessionEvent::new(EventKind::Agent, serde_json::json!({})),
        ];
        assert!(assert_tool_call_immediately_followed_by_result(&events).is_err());
    }

    #[test]
    fn rejects_assistant_message_before_tool_resolved() {
        let history = vec![
            Message::assistant_tool_calls(vec![ToolCall {
                id: "call_1".to_string(),
                name: "stand__look".to_string(),
                arguments: "{}".to_string(),
            }]),
            Message::assistant("too soon"),
        ];
        assert!(assert_tool_calls_resolved_before_next_assistant(&history).is_err());
    }

    #[test]
    fn accepts_resolved_tool_call_before_next_assistant() {
        let history = vec![
            Message::assistant_tool_calls(vec![ToolCall {
                id: "call_1".to_string(),
                name: "stand__look".to_string(),
                arguments: "{}".to_string(),
            }]),
            Message::tool_result("stand", "call_1", "ok"),
            Message::assistant("done"),
        ];
        assert!(assert_tool_calls_resolved_before_next_assistant(&history).is_ok());
    }
}
