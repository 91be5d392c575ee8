use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::domain::PlayerSlot;

#[derive(Parser, Debug)]
#[command(author, version, about = "per-character Glicko-2 tier list for two players")]
pub struct Cli {
    #[clap(flatten)]
    pub storage: StorageArgs,

    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct StorageArgs {
    /// SQLite file holding the match log
    #[arg(long, global = true, env = "DATABASE_PATH", default_value = "matches.db")]
    pub database: String,

    /// Directory the snapshot is exported to
    #[arg(long, global = true, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct RecomputeArgs {
    /// Plain average instead of recency-weighted matchup win-rates
    #[arg(long)]
    pub unweighted: bool,

    /// Let quit-ended matches count towards ratings
    #[arg(long)]
    pub allow_exit: bool,

    /// Minimum match duration in seconds
    #[arg(long, value_name = "SECS")]
    pub min_duration: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotArg {
    P1,
    P2,
}

impl From<SlotArg> for PlayerSlot {
    fn from(slot: SlotArg) -> Self {
        match slot {
            SlotArg::P1 => PlayerSlot::P1,
            SlotArg::P2 => PlayerSlot::P2,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Recreate the database schema, dropping every stored match
    Reset,
    /// Recompute ratings and matchups from the stored matches
    Recalculate {
        #[clap(flatten)]
        options: RecomputeArgs,
    },
    /// Import match records from JSON files and update the snapshot
    Ingest {
        /// JSON files holding one record or an array of records
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Recompute everything after each record instead of updating incrementally
        #[arg(long)]
        full: bool,

        #[clap(flatten)]
        options: RecomputeArgs,
    },
    /// Print a rating table from the exported snapshot
    Show {
        #[arg(long, value_enum, default_value_t = SlotArg::P1)]
        slot: SlotArg,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ingest_with_overrides() {
        let cli = Cli::try_parse_from([
            "melee_tier_list",
            "ingest",
            "a.json",
            "b.json",
            "--full",
            "--allow-exit",
            "--min-duration",
            "45",
            "--database",
            "other.db",
        ])
        .unwrap();

        assert_eq!(cli.storage.database, "other.db");
        assert_eq!(
            cli.command,
            Command::Ingest {
                files: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
                full: true,
                options: RecomputeArgs {
                    unweighted: false,
                    allow_exit: true,
                    min_duration: Some(45.0),
                },
            }
        );
    }

    #[test]
    fn ingest_requires_files() {
        assert!(Cli::try_parse_from(["melee_tier_list", "ingest"]).is_err());
    }

    #[test]
    fn show_defaults_to_the_first_player() {
        let cli = Cli::try_parse_from(["melee_tier_list", "show"]).unwrap();
        assert_eq!(cli.command, Command::Show { slot: SlotArg::P1 });

        let cli = Cli::try_parse_from(["melee_tier_list", "show", "--slot", "p2"]).unwrap();
        assert_eq!(cli.command, Command::Show { slot: SlotArg::P2 });
    }
}
