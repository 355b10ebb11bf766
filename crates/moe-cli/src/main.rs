//! MOE CLI: the `moe` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    support::init_tracing();
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "moe starting");

    match cli.command {
        Commands::Render { expression, json } => commands::render::run(expression, json),

        Commands::Eval {
            expression,
            config,
            json,
        } => commands::eval::run(expression, config, json),

        Commands::Db { command } => commands::db::run(command),

        Commands::Concat {
            input,
            migrated_from,
            json,
        } => commands::concat::run(input, migrated_from, json),
    }
}
