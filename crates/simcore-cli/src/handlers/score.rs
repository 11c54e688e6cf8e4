use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use simcore_types::{CheckResult, RunResult};

use crate::args::ScoreArgs;

pub fn handle(args: ScoreArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.run_result)
        .with_context(|| format!("reading run result {}", args.run_result.display()))?;
    let result: RunResult = serde_json::from_str(&text)
        .with_context(|| format!("parsing run result {}", args.run_result.display()))?;
    print_report(&result);
    Ok(())
}

/// Formats an evaluation result as a human-readable scoring report.
/// Color is suppressed when stdout isn't a terminal (redirected to a
/// file, piped into another program).
pub fn print_report(result: &RunResult) {
    let color = std::io::stdout().is_terminal();

    println!("module: {}  agent: {}", result.module_id, result.agent_id);
    println!(
        "score: {:.2}  status: {}  events: {}",
        result.evaluation.score, result.evaluation.status, result.evaluation.num_events
    );

    let mut names: Vec<&String> = result.evaluation.checks.keys().collect();
    names.sort();

    for name in names {
        let line = match &result.evaluation.checks[name] {
            CheckResult::Passed { passed: true, .. } => format!("  {} {name}", label("PASS", color, true)),
            CheckResult::Passed { passed: false, .. } => format!("  {} {name}", label("FAIL", color, false)),
            CheckResult::Value { value } => format!("  {} {name} = {value}", label("VALUE", color, true)),
            CheckResult::Skipped { reason, .. } => format!("  {} {name} ({reason})", label("SKIP", color, true)),
            CheckResult::Error { error, .. } => format!("  {} {name}: {error}", label("ERROR", color, false)),
        };
        println!("{line}");
    }
}

fn label(text: &str, color: bool, good: bool) -> String {
    if !color {
        return text.to_string();
    }
    if good {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}
