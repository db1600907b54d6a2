//! Roster reconciliation and weekly XP tracking.
//!
//! The jobs a scheduler runs, each independently:
//!
//! * [`RosterSyncer`] upserts the clan roster into the member store.
//! * [`Orchestrator`] checks membership and applies XP readings, deleting
//!   members that left.
//! * [`XpUploader`] reports positive weekly deltas.
//! * [`LeaderboardService`] renders and publishes the boards.

#![warn(missing_docs)]

mod notifier;
mod orchestrator;
mod publisher;
mod syncer;
mod updater;
mod uploader;

pub use notifier::{LogNotifier, Notifier};
pub use orchestrator::{CycleReport, MemberOutcome, MemberReport, Orchestrator};
pub use publisher::{LeaderboardPublisher, LeaderboardService, LogPublisher, PublishReport};
pub use syncer::{RosterSyncer, SyncReport};
pub use updater::XpUpdater;
pub use uploader::{UploadReport, XpUploader};
