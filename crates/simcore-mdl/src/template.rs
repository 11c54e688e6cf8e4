//! Template interpolation: `{{name}}` substitution and
//! `{{#if}}/{{else if}}/{{else}}/{{/if}}` conditional blocks.
//!
//! Two substitution modes live side by side: when the *entire*
//! (trimmed) string is a single `{{name}}` placeholder, the bound
//! value's original JSON type is preserved (a numeric variable stays a
//! number). Anywhere else, `{{name}}` is stringified in place. This
//! lets a step param like `amount: "{{amount}}"` bind to a real
//! number while `text: "total is {{amount}}"` still renders a string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

static IF_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{\{#if\s+(.+?)\}\}(.*?)\{\{/if\}\}").unwrap());
static ELSE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{else if\s+(.+?)\}\}|\{\{else\}\}").unwrap());
static VAR_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").unwrap());
static WHOLE_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{\{(\w+)\}\}$").unwrap());

/// Resolves `{{#if}}` / `{{else if}}` / `{{else}}` / `{{/if}}` blocks in
/// `text`, evaluating each condition through `simcore_expr`. A
/// malformed condition expression is treated as false, same as any
/// other failed evaluation. Not recursive: nested conditional blocks
/// are not supported, matching the grammar's single-pass design.
fn resolve_conditionals(text: &str, vars: &BTreeMap<String, simcore_expr::Value>) -> String {
    IF_BLOCK
        .replace_all(text, |caps: &regex::Captures| {
            let first_condition = caps[1].trim().to_string();
            let body = &caps[2];

            let mut branches: Vec<(Option<String>, String)> = Vec::new();
            let mut last_end = 0;
            let mut pending_condition = Some(first_condition);

            for m in ELSE_MARKER.find_iter(body) {
                let segment = body[last_end..m.start()].to_string();
                branches.push((pending_condition.take(), segment));

                if let Some(caps) = ELSE_MARKER.captures(&body[m.start()..m.end()]) {
                    pending_condition = caps.get(1).map(|g| g.as_str().trim().to_string());
                }
                last_end = m.end();
            }
            branches.push((pending_condition.take(), body[last_end..].to_string()));

            for (condition, content) in branches {
                match condition {
                    None => return content.trim().to_string(),
                    Some(cond) => {
                        let truthy = simcore_expr::eval_str(&cond, vars)
                            .map(|v| v.is_truthy())
                            .unwrap_or(false);
                        if truthy {
                            return content.trim().to_string();
                        }
                    }
                }
            }

            String::new()
        })
        .into_owned()
}

/// Substitutes `{{name}}` placeholders against `vars`. Returns the
/// bound value's native JSON shape when the whole (trimmed) string is
/// one placeholder; otherwise returns a `Value::String` with each
/// placeholder stringified in place. An unresolved variable name is
/// left as the literal `{{name}}` text, never an error.
pub fn interpolate_string(text: &str, vars: &BTreeMap<String, simcore_expr::Value>) -> Value {
    let resolved = resolve_conditionals(text, vars);

    if let Some(caps) = WHOLE_PLACEHOLDER.captures(resolved.trim()) {
        let name = &caps[1];
        return match vars.get(name) {
            Some(value) => value.clone().into(),
            None => Value::String(resolved),
        };
    }

    let substituted = VAR_PLACEHOLDER.replace_all(&resolved, |caps: &regex::Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(value) => value.to_string(),
            None => format!("{{{{{name}}}}}"),
        }
    });

    Value::String(substituted.into_owned())
}

/// Recurses `interpolate_string` into every string leaf of a JSON
/// value tree (used for step `params`, tool `config`, and
/// `initial_state`, which may nest objects/arrays).
pub fn interpolate_value(value: &Value, vars: &BTreeMap<String, simcore_expr::Value>) -> Value {
    match value {
        Value::String(s) => interpolate_string(s, vars),
        Value::Array(items) => Value::Array(items.iter().map(|v| interpolate_value(v, vars)).collect()),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), interpolate_value(v, vars));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Convenience for fields that must remain a `String` regardless of
/// whole-placeholder typing (e.g. `system_prompt`).
pub fn interpolate_str(text: &str, vars: &BTreeMap<String, simcore_expr::Value>) -> String {
    match interpolate_string(text, vars) {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Evaluates a `step.condition` expression. Malformed expressions and
/// evaluation errors are treated as `false` (the step is skipped)
/// rather than propagated.
pub fn eval_condition(condition: &str, vars: &BTreeMap<String, simcore_expr::Value>) -> bool {
    simcore_expr::eval_str(condition, vars).map(|v| v.is_truthy()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, simcore_expr::Value)]) -> BTreeMap<String, simcore_expr::Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn whole_string_placeholder_preserves_type() {
        let vars = vars(&[("count", simcore_expr::Value::Number(5.0))]);
        let result = interpolate_string("{{count}}", &vars);
        assert_eq!(result, Value::Number(5.into()));
    }

    #[test]
    fn in_string_placeholder_stringifies() {
        let vars = vars(&[("count", simcore_expr::Value::Number(5.0))]);
        let result = interpolate_string("total: {{count}} items", &vars);
        assert_eq!(result, Value::String("total: 5 items".to_string()));
    }

    #[test]
    fn unresolved_placeholder_left_literal() {
        let vars = BTreeMap::new();
        let result = interpolate_string("hello {{name}}", &vars);
        assert_eq!(result, Value::String("hello {{name}}".to_string()));
    }

    #[test]
    fn if_else_if_else_chain_picks_first_true_branch() {
        let vars = vars(&[("tier", simcore_expr::Value::String("silver".to_string()))]);
        let text = "{{#if tier == \"gold\"}}VIP{{else if tier == \"silver\"}}Valued{{else}}Guest{{/if}}";
        let resolved = resolve_conditionals(text, &vars);
        assert_eq!(resolved, "Valued");
    }

    #[test]
    fn malformed_condition_is_treated_as_false() {
        let vars = BTreeMap::new();
        let text = "{{#if ???}}shown{{else}}fallback{{/if}}";
        let resolved = resolve_conditionals(text, &vars);
        assert_eq!(resolved, "fallback");
    }
}
