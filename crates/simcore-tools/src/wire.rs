//! Action-name wire codec: a tool call on the wire names both the tool
//! instance and the action as `<tool>__<action>`, split on the
//! *first* `__` so a tool or action name containing `__` of its own
//! doesn't get misparsed.

/// Splits `"shopify__refund_order"` into `("shopify", "refund_order")`.
/// Returns `None` if there is no `__` separator at all.
pub fn decode(wire_name: &str) -> Option<(&str, &str)> {
    wire_name.split_once("__")
}

pub fn encode(tool: &str, action: &str) -> String {
    format!("{tool}__{action}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_double_underscore() {
        assert_eq!(decode("shopify__refund_order"), Some(("shopify", "refund_order")));
    }

    #[test]
    fn splits_on_first_when_action_itself_contains_separator() {
        assert_eq!(decode("shopify__list__orders"), Some(("shopify", "list__orders")));
    }

    #[test]
    fn no_separator_returns_none() {
        assert_eq!(decode("shopify"), None);
    }

    #[test]
    fn round_trips_through_encode() {
        let wire = encode("shopify", "refund_order");
        assert_eq!(decode(&wire), Some(("shopify", "refund_order")));
    }
}
