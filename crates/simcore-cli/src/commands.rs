use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::handlers;

pub fn run(cli: Cli) -> Result<()> {
    let workspace = simcore_runtime::resolve_workspace_path(cli.workspace.as_deref())?;

    match cli.command {
        Commands::Run(args) => handlers::run::handle(&workspace, args),
        Commands::Validate(args) => handlers::validate::handle(args),
        Commands::Session(args) => handlers::session::handle(&workspace, args),
        Commands::Score(args) => handlers::score::handle(args),
    }
}
