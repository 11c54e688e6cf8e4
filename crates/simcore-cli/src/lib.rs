//! Library half of the `simcore` binary: argument parsing and command
//! dispatch, kept separate from `main.rs` so integration tests can
//! drive `commands::run` directly.

pub mod args;
pub mod commands;
pub mod handlers;
pub mod scripted_agent;
pub mod terminal_agent;

pub use args::Cli;
pub use commands::run;
