use anyhow::{bail, Context, Result};

use crate::args::ValidateArgs;

pub fn handle(args: ValidateArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.module)
        .with_context(|| format!("reading module {}", args.module.display()))?;
    let module = simcore_mdl::parse_module(&text)
        .with_context(|| format!("parsing module {}", args.module.display()))?;
    let issues = simcore_mdl::validate(&module);

    if issues.is_empty() {
        println!("{} is valid", args.module.display());
        return Ok(());
    }

    for issue in &issues {
        println!("{issue}");
    }
    bail!("{} issue(s) found in {}", issues.len(), args.module.display());
}
