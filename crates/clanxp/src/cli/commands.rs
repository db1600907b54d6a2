//! Command-line arguments.

use clanxp_leaderboard::LeaderboardLimit;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Clan roster reconciliation and weekly XP tracker.
#[derive(Parser, Debug)]
#[command(name = "clanxp")]
#[command(version, about)]
pub struct Cli {
    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        default_value = "clanxp.toml",
        env = "CLANXP_CONFIG"
    )]
    pub config: PathBuf,

    /// Command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile the clan roster into the member store
    Sync,

    /// Check membership and refresh XP for every member
    Cycle {
        /// Close the weekly tracking window
        #[arg(long)]
        rollover: bool,
    },

    /// Upload positive weekly deltas
    Upload,

    /// Render and publish the leaderboards
    Leaderboard {
        /// Entries per board, a number or "all"; defaults to each board's setting
        #[arg(long)]
        limit: Option<LeaderboardLimit>,
    },

    /// Register a channel that shows a board
    RegisterBoard {
        /// Board tag, e.g. member_clan_xp
        tag: String,
        /// Channel id in the messaging client
        channel_id: i64,
    },

    /// Run the scheduled jobs until interrupted
    Serve,

    /// Apply pending database migrations
    Migrate,
}
