//! Roster reconciliation.

use clanxp_api::RosterSource;
use clanxp_core::{NewMember, RosterRecord};
use clanxp_database::MemberRepository;
use clanxp_error::{ClanXpResult, DatabaseResult};
use derive_getters::Getters;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Counts from one roster sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters)]
pub struct SyncReport {
    /// Members stored for the first time
    created: usize,
    /// Members whose name or messaging identity changed
    updated: usize,
    /// Members already up to date
    unchanged: usize,
    /// Feed entries without the required fields
    skipped: usize,
    /// Records the store rejected
    failed: usize,
}

impl SyncReport {
    /// Whether the sync changed stored state.
    pub fn changed_anything(&self) -> bool {
        self.created > 0 || self.updated > 0
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "created {}, updated {}, unchanged {}, skipped {}, failed {}",
            self.created, self.updated, self.unchanged, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Created,
    Updated,
    Unchanged,
}

/// Reconciles the external roster into the member store.
///
/// New account ids become members with an unseeded baseline. Known members
/// take the roster's current name and, if they had none, its messaging
/// identity. Members missing from the feed are left alone; removal is the
/// membership check's job.
#[derive(Clone)]
pub struct RosterSyncer {
    source: Arc<dyn RosterSource>,
    members: Arc<dyn MemberRepository>,
}

impl RosterSyncer {
    /// Create a syncer.
    pub fn new(source: Arc<dyn RosterSource>, members: Arc<dyn MemberRepository>) -> Self {
        Self { source, members }
    }

    /// Fetch the roster once and upsert every record.
    ///
    /// A record the store rejects (for example a display name another
    /// member still holds) is counted as failed and the sync moves on.
    ///
    /// # Errors
    ///
    /// Returns an error if the roster cannot be fetched or decoded.
    #[instrument(skip(self))]
    pub async fn sync_roster(&self) -> ClanXpResult<SyncReport> {
        let feed = self.source.fetch_roster().await?;
        let mut report = SyncReport {
            skipped: *feed.skipped(),
            ..SyncReport::default()
        };

        for record in feed.into_records() {
            match self.upsert(&record).await {
                Ok(RecordOutcome::Created) => report.created += 1,
                Ok(RecordOutcome::Updated) => report.updated += 1,
                Ok(RecordOutcome::Unchanged) => report.unchanged += 1,
                Err(e) => {
                    warn!(
                        external_id = %record.external_id(),
                        nickname = %record.nickname(),
                        error = %e,
                        "Failed to store roster record"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(%report, "Roster sync finished");
        Ok(report)
    }

    async fn upsert(&self, record: &RosterRecord) -> DatabaseResult<RecordOutcome> {
        match self.members.find_by_external_id(record.external_id()).await? {
            None => {
                let member = self.members.insert_member(&NewMember::from(record)).await?;
                debug!(id = *member.id(), name = %member.display_name(), "Added member");
                Ok(RecordOutcome::Created)
            }
            Some(mut member) => {
                if !member.reconcile(record) {
                    return Ok(RecordOutcome::Unchanged);
                }
                self.members.save_member(&member).await?;
                debug!(id = *member.id(), name = %member.display_name(), "Updated member");
                Ok(RecordOutcome::Updated)
            }
        }
    }
}

impl std::fmt::Debug for RosterSyncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterSyncer").finish_non_exhaustive()
    }
}
