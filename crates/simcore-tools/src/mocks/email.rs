//! Mock email tool, scoped to `send_email`/`list_sent` — the subset
//! the literal scenarios and `env_state`-observing checks need. Sent
//! messages are also mirrored into `env_state.sent_emails` so
//! `env_state` evaluation checks can observe them without a tool call.

use crate::tool::{ActionSpec, Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Mutex;
use uuid::Uuid;

pub struct MockEmailTool {
    name: String,
    sent: Mutex<Vec<Value>>,
}

impl MockEmailTool {
    pub fn new(name: impl Into<String>, _config: &Value) -> Self {
        Self { name: name.into(), sent: Mutex::new(Vec::new()) }
    }

    fn send_email(&self, args: &Value, env_state: &mut Value) -> ToolResult {
        let Some(to) = args.get("to").and_then(|v| v.as_str()) else {
            return ToolResult::fail("'to' recipient is required");
        };
        if !to.contains('@') {
            return ToolResult::fail(format!("Invalid email address: {to}"));
        }
        let subject = args.get("subject").and_then(|v| v.as_str()).unwrap_or("");
        let body = args.get("body").and_then(|v| v.as_str()).unwrap_or("");

        let email_id = Uuid::new_v4().to_string()[..8].to_string();
        let email = json!({
            "id": email_id,
            "to": to,
            "subject": subject,
            "body": body,
            "status": "sent",
        });

        self.sent.lock().unwrap().push(email.clone());

        if let Some(obj) = env_state.as_object_mut() {
            let sent_list = obj.entry("sent_emails").or_insert_with(|| Value::Array(Vec::new()));
            if let Some(arr) = sent_list.as_array_mut() {
                arr.push(email);
            }
        }

        ToolResult::ok(json!({ "email_id": email_id, "status": "sent", "to": to }))
    }

    fn list_sent(&self, args: &Value) -> ToolResult {
        let limit = args.get("limit").and_then(|v| v.as_u64()).unwrap_or(10) as usize;
        let sent = self.sent.lock().unwrap();
        let emails: Vec<Value> = sent.iter().take(limit).cloned().collect();
        ToolResult::ok(json!({ "emails": emails, "count": emails.len() }))
    }
}

impl Tool for MockEmailTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, action: &str, args: &Value, env_state: &mut Value) -> ToolResult {
        match action {
            "send_email" => self.send_email(args, env_state),
            "list_sent" => self.list_sent(args),
            other => ToolResult::fail(format!("Unknown action: {other}")),
        }
    }

    fn actions(&self) -> Vec<ActionSpec> {
        vec![
            ActionSpec {
                name: "send_email".to_string(),
                description: "Send an email".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "to": { "type": "string" },
                        "subject": { "type": "string" },
                        "body": { "type": "string" },
                    },
                    "required": ["to"],
                }),
            },
            ActionSpec {
                name: "list_sent".to_string(),
                description: "List sent emails".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "limit": { "type": "integer" } },
                }),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_email_rejects_addresses_without_at_sign() {
        let tool = MockEmailTool::new("email", &Value::Null);
        let mut env_state = Value::Null;
        let result = tool.invoke("send_email", &json!({ "to": "not-an-email" }), &mut env_state);
        assert!(!result.success);
    }

    #[test]
    fn send_email_mirrors_into_env_state() {
        let tool = MockEmailTool::new("email", &Value::Null);
        let mut env_state = json!({});
        let result = tool.invoke(
            "send_email",
            &json!({ "to": "a@example.com", "subject": "hi" }),
            &mut env_state,
        );
        assert!(result.success);
        assert_eq!(env_state["sent_emails"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn list_sent_respects_limit() {
        let tool = MockEmailTool::new("email", &Value::Null);
        let mut env_state = json!({});
        for _ in 0..3 {
            tool.invoke("send_email", &json!({ "to": "a@example.com" }), &mut env_state);
        }
        let result = tool.invoke("list_sent", &json!({ "limit": 2 }), &mut env_state);
        assert_eq!(result.data["count"], json!(2));
    }
}
