//! Command-line interface for the clanxp binary.

mod commands;

pub use commands::{Cli, Commands};

use crate::{ClanXp, ClanXpConfig};
use clanxp_database::{establish_connection, run_migrations};
use tracing::info;

/// Execute `command` against the configured deployment.
///
/// # Errors
///
/// Returns the command's error.
pub async fn run(command: Commands, config: ClanXpConfig) -> anyhow::Result<()> {
    if command == Commands::Migrate {
        let url = config.database().resolve_url()?;
        let applied = tokio::task::spawn_blocking(move || {
            let mut conn = establish_connection(&url)?;
            run_migrations(&mut conn)
        })
        .await??;
        println!("Applied {} migrations", applied);
        return Ok(());
    }

    let app = ClanXp::connect(config)?;
    match command {
        Commands::Sync => {
            let report = app.sync_roster().await?;
            println!("Roster sync: {}", report);
        }
        Commands::Cycle { rollover } => {
            let report = app.run_cycle(rollover).await?;
            println!("Cycle: {}", report);
            for member in report.members().iter().filter(|m| m.outcome().is_failure()) {
                println!("  {}: {}", member.display_name(), member.outcome());
            }
        }
        Commands::Upload => {
            let report = app.upload_deltas().await?;
            println!("Upload: {}", report);
        }
        Commands::Leaderboard { limit } => {
            let report = app.publish_leaderboards(limit).await?;
            println!(
                "Leaderboards: published {}, failed {}",
                report.published(),
                report.failed()
            );
        }
        Commands::RegisterBoard { tag, channel_id } => {
            let display = app.register_board(&tag, channel_id).await?;
            println!(
                "Registered board {} in channel {}",
                display.tag(),
                display.channel_id()
            );
        }
        Commands::Serve => {
            info!("Press Ctrl+C to stop");
            app.serve(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    std::future::pending::<()>().await;
                }
            })
            .await?;
        }
        Commands::Migrate => {}
    }
    Ok(())
}
