//! clanxp - clan roster reconciliation and weekly XP tracker.

use clanxp::cli::{Cli, run};
use clanxp::{ClanXpConfig, init_tracing};
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClanXpConfig::load(&cli.config)?;
    init_tracing(config.log_level(), *config.log_format());
    info!(config_file = ?cli.config, command = ?cli.command, "Starting clanxp");

    run(cli.command, config).await
}
