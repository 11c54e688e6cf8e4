use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use simcore_engine::Agent;
use simcore_runtime::{EngineConfig, SessionManager};
use simcore_types::{EventKind, SessionEvent};

use crate::args::SessionArgs;
use crate::scripted_agent::FileScriptedAgent;
use crate::terminal_agent::TerminalAgent;

use super::common::{build_tool_map, load_module};

pub fn handle(workspace: &Path, args: SessionArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime for the interactive session")?;
    runtime.block_on(drive(workspace, args))
}

async fn drive(workspace: &Path, args: SessionArgs) -> Result<()> {
    let module = load_module(&args.module, &args.bindings)?;
    let config = EngineConfig::load()?;
    let tools = build_tool_map(&module, workspace, &config, &args.tools_dir)?;
    let max_tool_calls = args.max_tool_calls.unwrap_or(config.max_tool_calls);

    let agent: Box<dyn Agent> = match &args.agent_script {
        Some(path) => Box::new(FileScriptedAgent::load(path)?),
        None => Box::new(TerminalAgent::new()),
    };

    let manager = SessionManager::new();
    let id = manager.create(Arc::new(module), agent, tools, max_tool_calls).await;
    println!("session {id} started");

    loop {
        let Some(event) = manager.recv_event(&id).await? else {
            break;
        };
        print_event(&event);

        if event.kind == EventKind::AwaitingInput {
            let Some(line) = read_line().await? else {
                manager.delete(&id).await?;
                break;
            };
            manager.provide_input(&id, line).await?;
        }

        if matches!(event.kind, EventKind::Completed | EventKind::Error) {
            break;
        }
    }

    Ok(())
}

/// Reads one line of user input off a blocking thread so a slow typist
/// doesn't stall the session task sharing this runtime.
async fn read_line() -> Result<Option<String>> {
    print!("> ");
    std::io::Write::flush(&mut std::io::stdout()).ok();

    let line = tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        let n = std::io::stdin().read_line(&mut buf).unwrap_or(0);
        (n, buf)
    })
    .await
    .context("reading terminal input")?;

    let (bytes_read, buf) = line;
    if bytes_read == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

fn print_event(event: &SessionEvent) {
    println!("[{:?}] {}", event.kind, event.payload);
}
