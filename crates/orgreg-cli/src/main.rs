//! orgreg CLI: the `orgreg` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use orgreg_store::EntityKind;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let store = support::open_store_or_exit(cli.config.as_deref(), cli.data_dir.as_deref());

    match cli.command {
        Commands::Init { json } => commands::init::run(&store, json),

        Commands::Organization { command } => {
            commands::record::run(&store, EntityKind::Organization, command)
        }

        Commands::Member { command } => commands::record::run(&store, EntityKind::Member, command),
    }
}
