//! Storage traits used by the tracker.

use crate::DisplayMessage;
use async_trait::async_trait;
use clanxp_core::{Member, NewMember};
use clanxp_error::DatabaseResult;

/// Persistent store of tracked members.
///
/// Implementations must enforce uniqueness of `external_id` and
/// `display_name`; a colliding insert or save fails with
/// `DatabaseErrorKind::UniqueViolation` rather than producing a duplicate.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// All members in insertion order.
    async fn list_members(&self) -> DatabaseResult<Vec<Member>>;

    /// Look up a member by roster account id.
    async fn find_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<Member>>;

    /// Store a new member and return it with its assigned id.
    async fn insert_member(&self, member: &NewMember) -> DatabaseResult<Member>;

    /// Write back name, messaging identity and XP fields.
    async fn save_member(&self, member: &Member) -> DatabaseResult<()>;

    /// Remove a member permanently.
    async fn delete_member(&self, id: i32) -> DatabaseResult<()>;
}

/// Index of the messages that display each leaderboard.
#[async_trait]
pub trait DisplayMessageRepository: Send + Sync {
    /// Every channel message registered for a board tag.
    async fn find_by_tag(&self, tag: &str) -> DatabaseResult<Vec<DisplayMessage>>;

    /// Register a channel that should show the given board.
    async fn register(&self, tag: &str, channel_id: i64) -> DatabaseResult<DisplayMessage>;

    /// Remember which message now shows the board.
    async fn record_message_id(&self, id: i32, message_id: i64) -> DatabaseResult<()>;
}
