use anyhow::Result;

use melee_tier_list::cli::{Cli, Command};
use melee_tier_list::{handle_ingest, handle_recalculate, handle_reset, handle_show, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    execute_command(&cli)
}

fn execute_command(cli: &Cli) -> Result<()> {
    let storage = &cli.storage;
    match &cli.command {
        Command::Reset => handle_reset(storage),
        Command::Recalculate { options } => handle_recalculate(storage, options),
        Command::Ingest {
            files,
            full,
            options,
        } => handle_ingest(storage, files, *full, options),
        Command::Show { slot } => handle_show(storage, *slot),
    }
}
