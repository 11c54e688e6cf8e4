use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Resolve the workspace data directory: explicit path, then
/// `SIMCORE_PATH`, then the XDG data directory, then `~/.simcore`.
pub fn resolve_workspace_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("SIMCORE_PATH") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("simcore"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".simcore"));
    }

    Err(Error::Config(
        "could not determine workspace path: no HOME directory or XDG data directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// Non-module-specific engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_max_tool_calls")]
    pub max_tool_calls: usize,
    #[serde(default = "default_retry_after_tool")]
    pub retry_after_tool: bool,
    #[serde(default = "default_tool_spec_dirs")]
    pub tool_spec_dirs: Vec<PathBuf>,
}

fn default_max_tool_calls() -> usize {
    simcore_engine::DEFAULT_MAX_TOOL_CALLS
}

fn default_retry_after_tool() -> bool {
    true
}

fn default_tool_spec_dirs() -> Vec<PathBuf> {
    vec![PathBuf::from("tools/core"), PathBuf::from("tools/community")]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: default_max_tool_calls(),
            retry_after_tool: default_retry_after_tool(),
            tool_spec_dirs: default_tool_spec_dirs(),
        }
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(resolve_workspace_path(None)?.join("config.toml"))
    }
}
