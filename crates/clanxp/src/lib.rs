//! Clan roster reconciliation and weekly XP tracking.
//!
//! This crate ties the workspace together: configuration, tracing setup,
//! the cron job schedule and the [`ClanXp`] application that the `clanxp`
//! binary drives. The member crates are re-exported for library users.
//!
//! # Example
//!
//! ```no_run
//! use clanxp::{ClanXp, ClanXpConfig};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClanXpConfig::load(Path::new("clanxp.toml"))?;
//! let app = ClanXp::connect(config)?;
//!
//! let report = app.sync_roster().await?;
//! println!("{}", report);
//! app.run_cycle(false).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod app;
pub mod cli;
mod config;
mod logging;
mod schedule;

pub use app::{ClanXp, Services};
pub use config::{ClanXpConfig, DatabaseConfig, ENV_PREFIX, LogFormat, NotificationConfig};
pub use logging::init_tracing;
pub use schedule::{Job, JobSchedule, ScheduleConfig};

pub use clanxp_api as api;
pub use clanxp_core as domain;
pub use clanxp_database as database;
pub use clanxp_error as error;
pub use clanxp_leaderboard as leaderboard;
pub use clanxp_rate_limit as rate_limit;
pub use clanxp_tracker as tracker;

pub use clanxp_core::{Member, MembershipStatus, RosterRecord};
pub use clanxp_error::{ClanXpError, ClanXpErrorKind, ClanXpResult};
