//! Tool-spec catalog: YAML documents under a search path that
//! advertise `type: <name>` and metadata for tool types the built-in
//! registry does not construct itself. Rust has no dynamic
//! `module:Class` loading, so a catalog entry only extends which type
//! names are *known* (for `validate`/listing purposes) — constructing
//! an instance still requires a built-in constructor; a catalog-only
//! type with no constructor fails the same as an entirely unknown one.

use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ToolSpecDoc {
    pub type_name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    specs: HashMap<String, ToolSpecDoc>,
}

impl ToolCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scans `dirs` for `*.yaml`/`*.yml` files carrying a top-level
    /// `type` key. Unparseable files are skipped, not fatal — mirrors
    /// the loader's "best effort" discovery pass.
    pub fn discover(dirs: &[&Path]) -> Self {
        let mut specs = HashMap::new();

        for dir in dirs {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_yaml = path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml");
                if !is_yaml {
                    continue;
                }
                let Ok(text) = std::fs::read_to_string(&path) else {
                    continue;
                };
                let Ok(raw) = serde_yaml::from_str::<serde_yaml::Value>(&text) else {
                    continue;
                };
                let Some(type_name) = raw.get("type").and_then(|v| v.as_str()) else {
                    continue;
                };
                let description = raw
                    .get("description")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string();
                specs.insert(
                    type_name.to_string(),
                    ToolSpecDoc { type_name: type_name.to_string(), description },
                );
            }
        }

        Self { specs }
    }

    pub fn get(&self, type_name: &str) -> Option<&ToolSpecDoc> {
        self.specs.get(type_name)
    }

    pub fn known_types(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn discovers_type_from_yaml_spec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("widget.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "type: widget_fetcher\ndescription: fetches widgets").unwrap();

        let catalog = ToolCatalog::discover(&[dir.path()]);
        assert!(catalog.get("widget_fetcher").is_some());
    }

    #[test]
    fn skips_unparseable_files_without_failing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "not: [valid: yaml").unwrap();

        let catalog = ToolCatalog::discover(&[dir.path()]);
        assert_eq!(catalog.known_types().count(), 0);
    }
}
