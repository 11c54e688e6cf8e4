//! Construction of `Tool` instances from a module's `environment.tools`.
//! Resolution order: built-in registry first, then the discovered
//! catalog (which only confirms the type name is known — construction
//! still requires a built-in constructor).

use crate::catalog::ToolCatalog;
use crate::error::{Error, Result};
use crate::mocks::{MockBrowserTool, MockEmailTool, MockShopifyTool};
use crate::tool::Tool;
use simcore_types::ToolRef;
use std::sync::Arc;

type Constructor = fn(&str, &serde_json::Value) -> Arc<dyn Tool>;

const BUILTINS: &[(&str, Constructor)] = &[
    ("mock_shopify", |name, config| Arc::new(MockShopifyTool::new(name, config))),
    ("mock_email", |name, config| Arc::new(MockEmailTool::new(name, config))),
    ("mock_browser", |name, config| Arc::new(MockBrowserTool::new(name, config))),
];

/// Builds one tool instance per `environment.tools[]` entry.
///
/// One instance per tool per session (`spec.md` §4.3): callers should
/// invoke this once per session construction and keep the result
/// alongside the session, not reconstruct on every step.
pub fn build_tools(tool_refs: &[ToolRef], catalog: &ToolCatalog) -> Result<Vec<Arc<dyn Tool>>> {
    tool_refs.iter().map(|tool_ref| build_one(tool_ref, catalog)).collect()
}

fn build_one(tool_ref: &ToolRef, catalog: &ToolCatalog) -> Result<Arc<dyn Tool>> {
    if let Some((_, ctor)) = BUILTINS.iter().find(|(name, _)| *name == tool_ref.type_) {
        return Ok(ctor(&tool_ref.name, &tool_ref.config));
    }

    if catalog.get(&tool_ref.type_).is_some() {
        return Err(Error::UnknownToolType(format!(
            "{} (found in catalog but no built-in constructor is registered)",
            tool_ref.type_
        )));
    }

    Err(Error::UnknownToolType(tool_ref.type_.clone()))
}

/// Type names the registry can actually construct, independent of any
/// catalog — used by `simcore-cli`'s `tools list` and by `validate`.
pub fn builtin_type_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simcore_types::ToolRef;

    #[test]
    fn builds_builtin_tool_by_type() {
        let tool_ref = ToolRef {
            name: "shop".to_string(),
            type_: "mock_shopify".to_string(),
            description: String::new(),
            config: serde_json::Value::Null,
        };
        let catalog = ToolCatalog::empty();
        let tools = build_tools(&[tool_ref], &catalog).unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name(), "shop");
    }

    #[test]
    fn unknown_type_fails_session_construction() {
        let tool_ref = ToolRef {
            name: "mystery".to_string(),
            type_: "does_not_exist".to_string(),
            description: String::new(),
            config: serde_json::Value::Null,
        };
        let catalog = ToolCatalog::empty();
        let err = build_tools(&[tool_ref], &catalog).unwrap_err();
        assert!(matches!(err, Error::UnknownToolType(_)));
    }
}
