//! Module loading and tool construction shared by `run` and `session`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use simcore_runtime::EngineConfig;
use simcore_tools::{build_tools, Tool, ToolCatalog};
use simcore_types::Module;

/// Resolves `--bindings`: either an inline JSON object or `@path` to a
/// file containing one. Absent entirely, bindings are empty.
pub fn parse_bindings(raw: &Option<String>) -> Result<serde_json::Map<String, serde_json::Value>> {
    let Some(raw) = raw else {
        return Ok(serde_json::Map::new());
    };

    let text = match raw.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading bindings file {path}"))?
        }
        None => raw.clone(),
    };

    match serde_json::from_str(&text).context("parsing bindings as JSON")? {
        serde_json::Value::Object(map) => Ok(map),
        other => bail!("bindings must be a JSON object, got {other}"),
    }
}

/// Reads, parses, validates (warnings only), and binds a module
/// document. Validation issues are reported to stderr but never block
/// a run — only `simcore validate` treats them as failures.
pub fn load_module(path: &Path, bindings_raw: &Option<String>) -> Result<Module> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading module {}", path.display()))?;
    let module = simcore_mdl::parse_module(&text)
        .with_context(|| format!("parsing module {}", path.display()))?;

    for issue in simcore_mdl::validate(&module) {
        eprintln!("warning: {issue}");
    }

    let bindings = parse_bindings(bindings_raw)?;
    Ok(simcore_mdl::bind(&module, &bindings))
}

/// Discovers the tool-spec catalog and constructs one tool instance
/// per `environment.tools[]` entry, keyed by instance name the way
/// `Executor`/`interactive::spawn` expect.
pub fn build_tool_map(
    module: &Module,
    workspace: &Path,
    config: &EngineConfig,
    extra_tools_dirs: &[PathBuf],
) -> Result<HashMap<String, Arc<dyn Tool>>> {
    let mut dirs: Vec<PathBuf> = config.tool_spec_dirs.iter().map(|d| workspace.join(d)).collect();
    dirs.extend(extra_tools_dirs.iter().cloned());
    let dir_refs: Vec<&Path> = dirs.iter().map(PathBuf::as_path).collect();

    let catalog = ToolCatalog::discover(&dir_refs);
    let tools = build_tools(&module.environment.tools, &catalog)?;
    Ok(tools.into_iter().map(|t| (t.name().to_string(), t)).collect())
}
