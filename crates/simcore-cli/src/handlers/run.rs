use std::path::Path;

use anyhow::Result;

use simcore_engine::Executor;
use simcore_runtime::EngineConfig;
use simcore_types::RunResult;

use crate::args::{OutputFormat, RunArgs};
use crate::scripted_agent::FileScriptedAgent;

use super::common::{build_tool_map, load_module};
use super::score::print_report;

pub fn handle(workspace: &Path, args: RunArgs) -> Result<()> {
    let module = load_module(&args.module, &args.bindings)?;
    let config = EngineConfig::load()?;
    let tools = build_tool_map(&module, workspace, &config, &args.tools_dir)?;

    let mut agent = match &args.agent_script {
        Some(path) => FileScriptedAgent::load(path)?,
        None => FileScriptedAgent::stops_immediately(),
    };

    let max_tool_calls = args.max_tool_calls.unwrap_or(config.max_tool_calls);
    let executor = Executor::new(&module, &mut agent, tools).with_max_tool_calls(max_tool_calls);
    let (history, events, env_state) = executor.run()?;
    let evaluation = simcore_engine::evaluate(&module, &history, &events, &env_state);

    let result = RunResult {
        module_id: module.id.clone(),
        agent_id: module.agent_config.id.clone(),
        events,
        evaluation,
    };

    match args.format {
        OutputFormat::Json => println!("{}", result.to_json_pretty()?),
        OutputFormat::Pretty => print_report(&result),
    }

    Ok(())
}
