//! Declarative test environment builder: an isolated temp directory
//! seeded with module YAML fixtures and tool-spec catalog entries.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An isolated on-disk test environment. Dropped (and cleaned up) at
/// the end of the test that built it.
pub struct TestWorld {
    #[allow(dead_code)]
    temp_dir: TempDir,
    root: PathBuf,
    modules_dir: PathBuf,
    tools_dir: PathBuf,
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let modules_dir = root.join("modules");
        let tools_dir = root.join("tools").join("core");
        fs::create_dir_all(&modules_dir).expect("failed to create modules dir");
        fs::create_dir_all(&tools_dir).expect("failed to create tools dir");

        Self { temp_dir, root, modules_dir, tools_dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn modules_dir(&self) -> &Path {
        &self.modules_dir
    }

    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    /// Writes `yaml` as `<name>.yaml` under the modules directory and
    /// returns the path.
    pub fn write_module(&self, name: &str, yaml: &str) -> PathBuf {
        let path = self.modules_dir.join(format!("{name}.yaml"));
        fs::write(&path, yaml).expect("failed to write module fixture");
        path
    }

    /// Writes `yaml` as `<name>.yaml` under the tool-spec catalog
    /// directory and returns the path.
    pub fn write_tool_spec(&self, name: &str, yaml: &str) -> PathBuf {
        let path = self.tools_dir.join(format!("{name}.yaml"));
        fs::write(&path, yaml).expect("failed to write tool spec fixture");
        path
    }

    /// Parses and binds the module previously written under `name`
    /// against an empty binding set — convenience for tests that don't
    /// exercise variable binding directly.
    pub fn load_module(&self, name: &str) -> simcore_types::Module {
        let path = self.modules_dir.join(format!("{name}.yaml"));
        let text = fs::read_to_string(&path).expect("module fixture not found");
        let module = simcore_mdl::parser::parse_module(&text).expect("module fixture failed to parse");
        simcore_mdl::bind(&module, &serde_json::Map::new())
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_load_round_trips_a_module_fixture() {
        let world = TestWorld::new();
        world.write_module(
            "greet",
            r#"
id: greet
steps:
  - id: s1
    action: inject_user
    params:
      content: hi
"#,
        );
        let module = world.load_module("greet");
        assert_eq!(module.id, "greet");
        assert_eq!(module.steps.len(), 1);
    }

    #[test]
    fn tool_spec_lands_under_tools_dir() {
        let world = TestWorld::new();
        let path = world.write_tool_spec("widget", "type: widget_fetcher\n");
        assert!(path.starts_with(world.tools_dir()));
    }
}
