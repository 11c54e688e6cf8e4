//! Mock browser tool: a minimal, stateless-feeling fixture over a
//! fixed set of canned pages. No navigation history — only the
//! currently open URL is tracked, for `read_page` to echo back.

use crate::tool::{ActionSpec, Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Mutex;

pub struct MockBrowserTool {
    name: String,
    pages: serde_json::Map<String, Value>,
    current_url: Mutex<Option<String>>,
}

fn default_pages() -> serde_json::Map<String, Value> {
    let mut pages = serde_json::Map::new();
    pages.insert(
        "https://example.com".to_string(),
        json!("<html><body><h1>Example Domain</h1></body></html>"),
    );
    pages.insert(
        "https://example.com/policy".to_string(),
        json!(
            "Refund Policy: Refunds are allowed within 30 days of purchase. \
             Items must be in original condition. Digital products are non-refundable."
        ),
    );
    pages.insert(
        "https://example.com/faq".to_string(),
        json!(
            "FAQ:\nQ: How do I track my order?\nA: Use the tracking number sent to your email.\n\n\
             Q: What is your return policy?\nA: Items can be returned within 30 days."
        ),
    );
    pages
}

impl MockBrowserTool {
    pub fn new(name: impl Into<String>, config: &Value) -> Self {
        let pages = config
            .get("pages")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_else(default_pages);
        Self { name: name.into(), pages, current_url: Mutex::new(None) }
    }

    fn navigate(&self, args: &Value) -> ToolResult {
        let Some(url) = args.get("url").and_then(|v| v.as_str()) else {
            return ToolResult::fail("url is required");
        };
        let Some(content) = self.pages.get(url) else {
            return ToolResult::fail(format!("Page not found: {url}"));
        };
        *self.current_url.lock().unwrap() = Some(url.to_string());
        ToolResult::ok(json!({ "url": url, "content": content, "status_code": 200 }))
    }

    fn read_page(&self) -> ToolResult {
        let current = self.current_url.lock().unwrap().clone();
        match current {
            Some(url) => {
                let content = self.pages.get(&url).cloned().unwrap_or(Value::Null);
                ToolResult::ok(json!({ "url": url, "content": content }))
            }
            None => ToolResult::fail("No page is currently open"),
        }
    }

    fn click(&self, args: &Value) -> ToolResult {
        let selector = args.get("selector").and_then(|v| v.as_str()).unwrap_or("");
        if self.current_url.lock().unwrap().is_none() {
            return ToolResult::fail("No page is currently open");
        }
        ToolResult::ok(json!({ "selector": selector, "clicked": true }))
    }
}

impl Tool for MockBrowserTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, action: &str, args: &Value, _env_state: &mut Value) -> ToolResult {
        match action {
            "navigate" => self.navigate(args),
            "read_page" => self.read_page(),
            "click" => self.click(args),
            other => ToolResult::fail(format!("Unknown action: {other}")),
        }
    }

    fn actions(&self) -> Vec<ActionSpec> {
        vec![
            ActionSpec {
                name: "navigate".to_string(),
                description: "Open a URL and return its content".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "url": { "type": "string" } },
                    "required": ["url"],
                }),
            },
            ActionSpec {
                name: "read_page".to_string(),
                description: "Read the content of the currently open page".to_string(),
                parameters: json!({ "type": "object", "properties": {} }),
            },
            ActionSpec {
                name: "click".to_string(),
                description: "Click an element on the currently open page".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "selector": { "type": "string" } },
                    "required": ["selector"],
                }),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigate_then_read_page_round_trips_content() {
        let tool = MockBrowserTool::new("browser", &Value::Null);
        let mut env_state = Value::Null;
        let nav = tool.invoke("navigate", &json!({ "url": "https://example.com" }), &mut env_state);
        assert!(nav.success);

        let read = tool.invoke("read_page", &Value::Null, &mut env_state);
        assert!(read.success);
        assert_eq!(read.data["url"], "https://example.com");
    }

    #[test]
    fn read_page_before_navigate_fails() {
        let tool = MockBrowserTool::new("browser", &Value::Null);
        let mut env_state = Value::Null;
        let result = tool.invoke("read_page", &Value::Null, &mut env_state);
        assert!(!result.success);
    }

    #[test]
    fn navigate_to_unknown_url_fails() {
        let tool = MockBrowserTool::new("browser", &Value::Null);
        let mut env_state = Value::Null;
        let result = tool.invoke("navigate", &json!({ "url": "https://nope.test" }), &mut env_state);
        assert!(!result.success);
    }
}
