use clap::Parser;

use simcore::args::Cli;
use simcore::commands;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    if let Err(e) = commands::run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: simcore::args::LogLevel) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
