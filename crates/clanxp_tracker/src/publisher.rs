//! Leaderboard publishing through the messaging client.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use clanxp_database::{DisplayMessage, DisplayMessageRepository, MemberRepository};
use clanxp_error::{ClanXpResult, HttpResult};
use clanxp_leaderboard::{BoardConfig, Leaderboard, LeaderboardRenderer};
use derive_getters::Getters;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Delivers rendered boards to the messaging client.
#[async_trait]
pub trait LeaderboardPublisher: Send + Sync {
    /// Show `board` at `target`, editing its message if it has one.
    ///
    /// Returns the id of the message now showing the board, when the client
    /// knows it.
    async fn publish(
        &self,
        target: &DisplayMessage,
        board: &Leaderboard,
    ) -> HttpResult<Option<i64>>;
}

/// Writes boards to the log instead of a chat channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPublisher;

#[async_trait]
impl LeaderboardPublisher for LogPublisher {
    async fn publish(
        &self,
        target: &DisplayMessage,
        board: &Leaderboard,
    ) -> HttpResult<Option<i64>> {
        info!(
            tag = %target.tag(),
            channel_id = *target.channel_id(),
            "\n{}",
            board
        );
        Ok(*target.message_id())
    }
}

/// Counts from one publishing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct PublishReport {
    /// Messages shown or refreshed
    published: usize,
    /// Messages the client failed to update
    failed: usize,
}

/// Renders every configured board and publishes it to its display messages.
#[derive(Clone)]
pub struct LeaderboardService {
    members: Arc<dyn MemberRepository>,
    displays: Arc<dyn DisplayMessageRepository>,
    publisher: Arc<dyn LeaderboardPublisher>,
    renderer: LeaderboardRenderer,
}

impl LeaderboardService {
    /// Create a service.
    pub fn new(
        members: Arc<dyn MemberRepository>,
        displays: Arc<dyn DisplayMessageRepository>,
        publisher: Arc<dyn LeaderboardPublisher>,
        renderer: LeaderboardRenderer,
    ) -> Self {
        Self {
            members,
            displays,
            publisher,
            renderer,
        }
    }

    /// Render and publish each board at `now`.
    ///
    /// A message id reported by the publisher is recorded so the next run
    /// edits the same message. Per-message failures are logged and counted.
    ///
    /// # Errors
    ///
    /// Returns an error if members or display messages cannot be loaded.
    #[instrument(skip(self, boards))]
    pub async fn publish_leaderboards(
        &self,
        boards: &[BoardConfig],
        now: NaiveDateTime,
    ) -> ClanXpResult<PublishReport> {
        let members = self.members.list_members().await?;
        let mut report = PublishReport::default();

        for config in boards {
            let board = self.renderer.render(&members, *config.limit(), now);
            let targets = self.displays.find_by_tag(config.tag()).await?;
            if targets.is_empty() {
                debug!(tag = %config.tag(), "No display registered for board");
            }

            for target in targets {
                match self.publisher.publish(&target, &board).await {
                    Ok(message_id) => {
                        report.published += 1;
                        let known = *target.message_id();
                        if let Some(id) = message_id.filter(|id| Some(*id) != known) {
                            self.displays.record_message_id(*target.id(), id).await?;
                        }
                    }
                    Err(e) => {
                        warn!(
                            tag = %config.tag(),
                            channel_id = *target.channel_id(),
                            error = %e,
                            "Failed to publish leaderboard"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            published = report.published,
            failed = report.failed,
            "Leaderboards published"
        );
        Ok(report)
    }
}

impl std::fmt::Debug for LeaderboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeaderboardService")
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}
