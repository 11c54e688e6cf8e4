//! Mock Shopify store: orders, refunds, customers. Backs the refund
//! scenario in the literal session walkthroughs.

use crate::tool::{ActionSpec, Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Mutex;

pub struct MockShopifyTool {
    name: String,
    orders: Mutex<serde_json::Map<String, Value>>,
    customers: Mutex<serde_json::Map<String, Value>>,
}

fn default_orders() -> serde_json::Map<String, Value> {
    let mut orders = serde_json::Map::new();
    orders.insert(
        "ORD123".to_string(),
        json!({
            "id": "ORD123",
            "status": "Delivered",
            "refunded": false,
            "total": 99.99,
            "customer_email": "customer@example.com",
            "items": [{"name": "Widget", "quantity": 1, "price": 99.99}],
            "created_at": "2024-01-15T10:00:00Z",
        }),
    );
    orders
}

fn default_customers() -> serde_json::Map<String, Value> {
    let mut customers = serde_json::Map::new();
    customers.insert(
        "CUST001".to_string(),
        json!({
            "id": "CUST001",
            "email": "customer@example.com",
            "name": "John Doe",
            "total_orders": 5,
            "total_spent": 450.00,
        }),
    );
    customers
}

impl MockShopifyTool {
    pub fn new(name: impl Into<String>, config: &Value) -> Self {
        let orders = config
            .get("initial_orders")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_else(default_orders);
        let customers = config
            .get("initial_customers")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_else(default_customers);
        Self { name: name.into(), orders: Mutex::new(orders), customers: Mutex::new(customers) }
    }

    fn get_order(&self, args: &Value) -> ToolResult {
        let Some(order_id) = args.get("order_id").and_then(|v| v.as_str()) else {
            return ToolResult::fail("order_id is required");
        };
        let orders = self.orders.lock().unwrap();
        match orders.get(order_id) {
            Some(order) => ToolResult::ok(order.clone()),
            None => ToolResult::fail(format!("Order not found: {order_id}")),
        }
    }

    fn refund_order(&self, args: &Value, env_state: &mut Value) -> ToolResult {
        let Some(order_id) = args.get("order_id").and_then(|v| v.as_str()) else {
            return ToolResult::fail("order_id is required");
        };
        let reason = args.get("reason").and_then(|v| v.as_str()).unwrap_or("Customer request");

        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.get_mut(order_id) else {
            return ToolResult::fail(format!("Order not found: {order_id}"));
        };

        if order.get("refunded").and_then(|v| v.as_bool()).unwrap_or(false) {
            return ToolResult::fail("Order already refunded");
        }

        let refund_amount = order.get("total").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let order_obj = order.as_object_mut().expect("order is always an object");
        order_obj.insert("refunded".to_string(), Value::Bool(true));
        order_obj.insert("status".to_string(), Value::String("Refunded".to_string()));
        order_obj.insert("refund_reason".to_string(), Value::String(reason.to_string()));

        if let Some(obj) = env_state.as_object_mut() {
            if let Some(balance) = obj.get("cash_balance").and_then(|v| v.as_f64()) {
                obj.insert("cash_balance".to_string(), json!(balance - refund_amount));
            }
        }

        ToolResult::ok(json!({
            "order_id": order_id,
            "status": "Refunded",
            "refund_amount": refund_amount,
            "reason": reason,
        }))
    }

    fn list_orders(&self, args: &Value) -> ToolResult {
        let status_filter = args.get("status").and_then(|v| v.as_str());
        let customer_email = args.get("customer_email").and_then(|v| v.as_str());

        let orders = self.orders.lock().unwrap();
        let filtered: Vec<Value> = orders
            .values()
            .filter(|o| status_filter.is_none_or(|s| o.get("status").and_then(|v| v.as_str()) == Some(s)))
            .filter(|o| {
                customer_email.is_none_or(|e| o.get("customer_email").and_then(|v| v.as_str()) == Some(e))
            })
            .cloned()
            .collect();

        ToolResult::ok(json!({ "orders": filtered, "count": filtered.len() }))
    }

    fn get_customer(&self, args: &Value) -> ToolResult {
        let customer_id = args.get("customer_id").and_then(|v| v.as_str());
        let email = args.get("email").and_then(|v| v.as_str());

        let customers = self.customers.lock().unwrap();
        let customer = if let Some(id) = customer_id {
            customers.get(id).cloned()
        } else if let Some(email) = email {
            customers.values().find(|c| c.get("email").and_then(|v| v.as_str()) == Some(email)).cloned()
        } else {
            return ToolResult::fail("customer_id or email is required");
        };

        match customer {
            Some(c) => ToolResult::ok(c),
            None => ToolResult::fail("Customer not found"),
        }
    }

    fn update_order_status(&self, args: &Value) -> ToolResult {
        let Some(order_id) = args.get("order_id").and_then(|v| v.as_str()) else {
            return ToolResult::fail("order_id is required");
        };
        let Some(new_status) = args.get("status").and_then(|v| v.as_str()) else {
            return ToolResult::fail("status is required");
        };

        let mut orders = self.orders.lock().unwrap();
        let Some(order) = orders.get_mut(order_id) else {
            return ToolResult::fail(format!("Order not found: {order_id}"));
        };
        order
            .as_object_mut()
            .expect("order is always an object")
            .insert("status".to_string(), Value::String(new_status.to_string()));

        ToolResult::ok(json!({ "order_id": order_id, "status": new_status }))
    }
}

impl Tool for MockShopifyTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn invoke(&self, action: &str, args: &Value, env_state: &mut Value) -> ToolResult {
        match action {
            "get_order" => self.get_order(args),
            "refund_order" => self.refund_order(args, env_state),
            "list_orders" => self.list_orders(args),
            "get_customer" => self.get_customer(args),
            "update_order_status" => self.update_order_status(args),
            other => ToolResult::fail(format!("Unknown action: {other}")),
        }
    }

    fn actions(&self) -> Vec<ActionSpec> {
        vec![
            ActionSpec {
                name: "get_order".to_string(),
                description: "Get details of an order by ID".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": { "order_id": { "type": "string" } },
                    "required": ["order_id"],
                }),
            },
            ActionSpec {
                name: "refund_order".to_string(),
                description: "Process a refund for an order".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "order_id": { "type": "string" },
                        "reason": { "type": "string" },
                    },
                    "required": ["order_id"],
                }),
            },
            ActionSpec {
                name: "list_orders".to_string(),
                description: "List orders with optional filters".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "customer_email": { "type": "string" },
                    },
                }),
            },
            ActionSpec {
                name: "get_customer".to_string(),
                description: "Get customer details".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "customer_id": { "type": "string" },
                        "email": { "type": "string" },
                    },
                }),
            },
            ActionSpec {
                name: "update_order_status".to_string(),
                description: "Update the status of an order".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "order_id": { "type": "string" },
                        "status": { "type": "string" },
                    },
                    "required": ["order_id", "status"],
                }),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refund_decrements_cash_balance_and_rejects_double_refund() {
        let tool = MockShopifyTool::new("shopify", &Value::Null);
        let mut env_state = json!({ "cash_balance": 1000.0 });

        let result = tool.invoke("refund_order", &json!({ "order_id": "ORD123" }), &mut env_state);
        assert!(result.success);
        assert_eq!(env_state["cash_balance"], json!(900.01));

        let second = tool.invoke("refund_order", &json!({ "order_id": "ORD123" }), &mut env_state);
        assert!(!second.success);
        assert_eq!(second.error.unwrap(), "Order already refunded");
    }

    #[test]
    fn get_order_reports_missing_order() {
        let tool = MockShopifyTool::new("shopify", &Value::Null);
        let mut env_state = Value::Null;
        let result = tool.invoke("get_order", &json!({ "order_id": "NOPE" }), &mut env_state);
        assert!(!result.success);
    }

    #[test]
    fn unknown_action_fails_without_panicking() {
        let tool = MockShopifyTool::new("shopify", &Value::Null);
        let mut env_state = Value::Null;
        let result = tool.invoke("teleport_order", &Value::Null, &mut env_state);
        assert!(!result.success);
    }
}
