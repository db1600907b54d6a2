//! Persisting XP readings.

use clanxp_core::{Member, ReadingEffect};
use clanxp_database::MemberRepository;
use clanxp_error::DatabaseResult;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Applies XP readings to members and stores the result.
#[derive(Clone)]
pub struct XpUpdater {
    members: Arc<dyn MemberRepository>,
}

impl XpUpdater {
    /// Create an updater writing to `members`.
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    /// Apply `reading` to `member` and persist it.
    ///
    /// See [`Member::apply_reading`] for the seeding and rollover rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the member cannot be saved. `member` keeps the
    /// applied values either way.
    #[instrument(skip(self, member), fields(member = %member.display_name()))]
    pub async fn apply_reading(
        &self,
        member: &mut Member,
        reading: i64,
        is_rollover: bool,
    ) -> DatabaseResult<ReadingEffect> {
        let effect = member.apply_reading(reading, is_rollover);
        self.members.save_member(member).await?;
        debug!(
            baseline = *member.xp_baseline(),
            current = *member.xp_current(),
            seeded = *effect.seeded(),
            rolled_over = *effect.rolled_over(),
            "Stored XP reading"
        );
        Ok(effect)
    }
}

impl std::fmt::Debug for XpUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XpUpdater").finish_non_exhaustive()
    }
}
