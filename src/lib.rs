pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod matchups;
pub mod rating;
pub mod services;

use anyhow::{Result, bail};
use clap::Parser;
use cli::Cli;
use std::path::PathBuf;

use crate::cli::{RecomputeArgs, SlotArg, StorageArgs};
use crate::config::settings::{AppConfig, MatchupMode};
use crate::domain::PlayerSlot;
use crate::services::processing::ProcessingService;
use crate::services::{RecomputeStrategy, Snapshot};

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn handle_reset(storage: &StorageArgs) -> Result<()> {
    let service = build_service(storage, AppConfig::new())?;
    service.reset()
}

pub fn handle_recalculate(storage: &StorageArgs, options: &RecomputeArgs) -> Result<()> {
    let service = build_service(storage, build_config(options)?)?;
    let snapshot = service.recalculate()?;
    print_summary(&snapshot);
    Ok(())
}

pub fn handle_ingest(
    storage: &StorageArgs,
    files: &[PathBuf],
    full: bool,
    options: &RecomputeArgs,
) -> Result<()> {
    let strategy = if full {
        RecomputeStrategy::Full
    } else {
        RecomputeStrategy::Incremental
    };

    let service = build_service(storage, build_config(options)?)?;
    let summary = service.ingest_files(files, strategy)?;
    println!(
        "{} rated, {} excluded, {} already stored",
        summary.rated, summary.excluded, summary.duplicates
    );
    Ok(())
}

pub fn handle_show(storage: &StorageArgs, slot: SlotArg) -> Result<()> {
    let config = AppConfig::new();
    let service = build_service(storage, config.clone())?;

    let Some(snapshot) = service.load_snapshot()? else {
        bail!("No snapshot exported yet, run `recalculate` first");
    };

    let slot = PlayerSlot::from(slot);
    let identity = match slot {
        PlayerSlot::P1 => &config.players.p1,
        PlayerSlot::P2 => &config.players.p2,
    };
    println!("{} ratings ({})", slot.as_str(), identity.code);
    print!("{}", render_table(&snapshot, slot));
    Ok(())
}

/// Apply command-line overrides on top of the default settings.
pub fn build_config(options: &RecomputeArgs) -> Result<AppConfig> {
    let mut config = AppConfig::new();

    if options.unweighted {
        config.matchups.mode = MatchupMode::Unweighted;
    }
    if options.allow_exit {
        config.filter.allow_exit = true;
    }
    if let Some(seconds) = options.min_duration {
        if !seconds.is_finite() || seconds < 0.0 {
            bail!("Minimum duration must be a non-negative number of seconds, got {seconds}");
        }
        config.filter.min_game_duration_seconds = seconds;
    }

    Ok(config)
}

fn build_service(storage: &StorageArgs, config: AppConfig) -> Result<ProcessingService> {
    ProcessingService::new(config, &storage.database, &storage.cache_dir)
}

fn print_summary(snapshot: &Snapshot) {
    println!(
        "{} stored matches, {} matchup cells defined",
        snapshot.stored_matches,
        snapshot.matchups.defined_count()
    );
}

fn render_table(snapshot: &Snapshot, slot: PlayerSlot) -> String {
    let mut out = format!(
        "{:>3}  {:<16} {:>8} {:>7} {:>6}\n",
        "#", "CHARACTER", "RATING", "RD", "GAMES"
    );

    let ranked = snapshot.ratings.table(slot).ranked();
    let played: Vec<_> = ranked.iter().filter(|(_, state)| state.matches > 0).collect();

    for (rank, (character, state)) in played.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<16} {:>8.1} {:>7.1} {:>6}\n",
            rank + 1,
            character.as_str(),
            state.rating,
            state.rd,
            state.matches
        ));
    }

    let unplayed = ranked.len() - played.len();
    if unplayed > 0 {
        out.push_str(&format!("({unplayed} characters without rated games)\n"));
    }
    out
}
