use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `simcore`: run, validate, and interactively drive declarative
/// agent-simulation modules.
#[derive(Debug, Parser)]
#[command(name = "simcore", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Minimum log severity emitted to stderr. Overridden by `RUST_LOG`.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Explicit workspace directory. Falls back to `SIMCORE_PATH`, then
    /// the platform data directory, then `~/.simcore`.
    #[arg(long, global = true)]
    pub workspace: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a module to completion against a scripted agent.
    Run(RunArgs),
    /// Parse a module and report structural issues without running it.
    Validate(ValidateArgs),
    /// Drive an interactive session from the terminal.
    Session(SessionArgs),
    /// Print a formatted scoring report from a saved run result.
    Score(ScoreArgs),
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Path to the module YAML document.
    pub module: PathBuf,

    /// JSON object of variable bindings, inline or `@path/to/file.json`.
    #[arg(long)]
    pub bindings: Option<String>,

    /// Path to a JSON array of scripted agent actions. Defaults to an
    /// agent that stops immediately on its first turn.
    #[arg(long)]
    pub agent_script: Option<PathBuf>,

    /// Additional directories to scan for tool-spec catalogs, beyond
    /// the workspace's configured `tool_spec_dirs`.
    #[arg(long)]
    pub tools_dir: Vec<PathBuf>,

    #[arg(long)]
    pub max_tool_calls: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    pub module: PathBuf,
}

#[derive(Debug, clap::Args)]
pub struct SessionArgs {
    pub module: PathBuf,

    #[arg(long)]
    pub bindings: Option<String>,

    /// Drives the agent side from this scripted action file instead of
    /// prompting the terminal for each agent turn.
    #[arg(long)]
    pub agent_script: Option<PathBuf>,

    #[arg(long)]
    pub tools_dir: Vec<PathBuf>,

    #[arg(long)]
    pub max_tool_calls: Option<usize>,
}

#[derive(Debug, clap::Args)]
pub struct ScoreArgs {
    /// Path to a `RunResult` JSON document, as written by `run --format json`.
    pub run_result: PathBuf,
}
