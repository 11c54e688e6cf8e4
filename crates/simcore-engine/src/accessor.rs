//! The evaluator's accessor table: resolves a `CheckTarget` (or a
//! dotted `env.<path>` string) against a session's transcript.

use serde_json::Value;
use simcore_types::{CheckTarget, Message, Role, SessionEvent};

/// Joins a list of messages' content into one string, the shape
/// `contains`/`regex`/`equals` checks operate on.
pub fn joined_content(messages: &[&Message]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn agent_messages(history: &[Message]) -> Vec<&Message> {
    history.iter().filter(|m| m.role == Role::Assistant).collect()
}

pub fn user_messages(history: &[Message]) -> Vec<&Message> {
    history.iter().filter(|m| m.role == Role::User).collect()
}

pub fn all_messages(history: &[Message]) -> Vec<&Message> {
    history.iter().collect()
}

pub fn last_agent_message(history: &[Message]) -> String {
    agent_messages(history)
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

pub fn last_user_message(history: &[Message]) -> String {
    user_messages(history)
        .last()
        .map(|m| m.content.clone())
        .unwrap_or_default()
}

/// One `tool_call` event, as `tool_called` and `count` see it.
pub fn tool_call_events<'a>(events: &'a [SessionEvent]) -> Vec<&'a SessionEvent> {
    events
        .iter()
        .filter(|e| e.kind == simcore_types::EventKind::ToolCall)
        .collect()
}

/// Resolves `target` against the transcript, joining message lists
/// into a single string. Used by `contains`, `regex`, and the
/// `CheckTarget`-named half of `equals`.
pub fn resolve_text(target: &CheckTarget, history: &[Message]) -> String {
    match target {
        CheckTarget::AgentMessages => joined_content(&agent_messages(history)),
        CheckTarget::UserMessages => joined_content(&user_messages(history)),
        CheckTarget::AllMessages => joined_content(&all_messages(history)),
        CheckTarget::LastAgentMessage => last_agent_message(history),
        CheckTarget::LastUserMessage => last_user_message(history),
        CheckTarget::ToolCalls => String::new(),
    }
}

/// The list length `count` measures for a given target.
pub fn resolve_len(target: &CheckTarget, history: &[Message], events: &[SessionEvent]) -> usize {
    match target {
        CheckTarget::AgentMessages => agent_messages(history).len(),
        CheckTarget::UserMessages => user_messages(history).len(),
        CheckTarget::AllMessages => all_messages(history).len(),
        CheckTarget::LastAgentMessage | CheckTarget::LastUserMessage => {
            if resolve_text(target, history).is_empty() {
                0
            } else {
                1
            }
        }
        CheckTarget::ToolCalls => tool_call_events(events).len(),
    }
}

/// Reads a dotted path (`a.b.c`) out of a JSON value, or `None` if any
/// segment is missing or the value isn't an object at that point.
pub fn dotted_get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        if segment.is_empty() {
            continue;
        }
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Parses an `equals` target string: either a bare `CheckTarget` name
/// or `env.<dotted-path>`.
pub enum EqualsTarget {
    Message(CheckTarget),
    Env(String),
}

impl EqualsTarget {
    pub fn parse(target: &str) -> Option<Self> {
        if let Some(path) = target.strip_prefix("env.") {
            return Some(EqualsTarget::Env(path.to_string()));
        }
        let quoted = format!("\"{target}\"");
        serde_json::from_str::<CheckTarget>(&quoted)
            .ok()
            .map(EqualsTarget::Message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_text_joins_assistant_messages() {
        let history = vec![
            Message::user("hi"),
            Message::assistant("first"),
            Message::assistant("second"),
        ];
        assert_eq!(
            resolve_text(&CheckTarget::AgentMessages, &history),
            "first\nsecond"
        );
    }

    #[test]
    fn last_agent_message_empty_when_absent() {
        let history = vec![Message::user("hi")];
        assert_eq!(last_agent_message(&history), "");
    }

    #[test]
    fn dotted_get_walks_nested_objects() {
        let value = serde_json::json!({"a": {"b": {"c": 7}}});
        assert_eq!(dotted_get(&value, "a.b.c"), Some(&serde_json::json!(7)));
        assert_eq!(dotted_get(&value, "a.missing"), None);
    }

    #[test]
    fn equals_target_parses_env_prefix_and_bare_names() {
        assert!(matches!(
            EqualsTarget::parse("env.cash_balance"),
            Some(EqualsTarget::Env(p)) if p == "cash_balance"
        ));
        assert!(matches!(
            EqualsTarget::parse("last_agent_message"),
            Some(EqualsTarget::Message(CheckTarget::LastAgentMessage))
        ));
        assert!(EqualsTarget::parse("nonsense").is_none());
    }
}
