//! One reconciliation pass over every stored member.

use crate::{Notifier, XpUpdater};
use clanxp_api::{MembershipValidator, XpReader};
use clanxp_core::{Member, ReadingEffect};
use clanxp_database::MemberRepository;
use clanxp_error::{ClanXpError, ClanXpResult, HttpError};
use derive_getters::Getters;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// What happened to one member during a cycle.
#[derive(Debug, derive_more::Display)]
pub enum MemberOutcome {
    /// The clan service reported the member inactive and it was deleted
    #[display("removed")]
    Removed,
    /// A reading was applied and stored
    #[display("updated")]
    Updated(ReadingEffect),
    /// The profile could not be decoded; nothing changed
    #[display("no reading")]
    NoReading,
    /// The tracker rejected the lookup, likely after a rename
    #[display("lookup failed: {_0}")]
    LookupFailed(HttpError),
    /// Any other failure (transport, storage)
    #[display("failed: {_0}")]
    Failed(ClanXpError),
}

impl MemberOutcome {
    /// Whether processing this member failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, MemberOutcome::LookupFailed(_) | MemberOutcome::Failed(_))
    }
}

/// Outcome for a single member.
#[derive(Debug, Getters)]
pub struct MemberReport {
    /// Roster account id
    external_id: String,
    /// Name at the time of processing
    display_name: String,
    /// Result
    outcome: MemberOutcome,
}

/// All member outcomes of one cycle, in processing order.
#[derive(Debug, Default, Getters)]
pub struct CycleReport {
    /// Per-member results
    members: Vec<MemberReport>,
    /// Whether the cycle closed the tracking window
    is_rollover: bool,
}

impl CycleReport {
    fn count(&self, f: impl Fn(&MemberOutcome) -> bool) -> usize {
        self.members.iter().filter(|m| f(&m.outcome)).count()
    }

    /// Members deleted as inactive.
    pub fn removed(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Removed))
    }

    /// Members with a stored reading.
    pub fn updated(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Updated(_)))
    }

    /// Members whose window was closed.
    pub fn rolled_over(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Updated(effect) if *effect.rolled_over()))
    }

    /// Members without a usable reading.
    pub fn no_reading(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::NoReading))
    }

    /// Members the tracker rejected.
    pub fn lookup_failures(&self) -> impl Iterator<Item = &MemberReport> {
        self.members
            .iter()
            .filter(|m| matches!(m.outcome, MemberOutcome::LookupFailed(_)))
    }

    /// Members that failed for any reason.
    pub fn failed(&self) -> usize {
        self.count(MemberOutcome::is_failure)
    }
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} members: updated {} (rolled over {}), removed {}, no reading {}, failed {}",
            self.members.len(),
            self.updated(),
            self.rolled_over(),
            self.removed(),
            self.no_reading(),
            self.failed()
        )
    }
}

/// Drives membership checks and XP updates for every stored member.
///
/// Members are processed one after another. Each member's result is
/// collected independently, so a failure never stops the pass; only
/// failing to list the members aborts it.
#[derive(Clone)]
pub struct Orchestrator {
    members: Arc<dyn MemberRepository>,
    membership: Arc<dyn MembershipValidator>,
    xp: Arc<dyn XpReader>,
    updater: XpUpdater,
    notifier: Option<Arc<dyn Notifier>>,
}

impl Orchestrator {
    /// Create an orchestrator that does not send notifications.
    pub fn new(
        members: Arc<dyn MemberRepository>,
        membership: Arc<dyn MembershipValidator>,
        xp: Arc<dyn XpReader>,
    ) -> Self {
        Self {
            updater: XpUpdater::new(members.clone()),
            members,
            membership,
            xp,
            notifier: None,
        }
    }

    /// Report suspected identity changes to `notifier`.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Run one pass over all stored members.
    ///
    /// # Errors
    ///
    /// Returns an error only if the member list cannot be loaded.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, is_rollover: bool) -> ClanXpResult<CycleReport> {
        let members = self.members.list_members().await?;
        info!(count = members.len(), "Starting reconciliation cycle");

        let mut report = CycleReport {
            members: Vec::with_capacity(members.len()),
            is_rollover,
        };
        for member in members {
            let external_id = member.external_id().clone();
            let display_name = member.display_name().clone();
            let outcome = self.process_member(member, is_rollover).await;
            report.members.push(MemberReport {
                external_id,
                display_name,
                outcome,
            });
        }

        if let Some(notifier) = &self.notifier {
            for failure in report.lookup_failures() {
                if let MemberOutcome::LookupFailed(e) = &failure.outcome {
                    notifier
                        .identity_change_suspected(&failure.display_name, e)
                        .await;
                }
            }
        }

        info!(%report, "Reconciliation cycle finished");
        Ok(report)
    }

    #[instrument(skip(self, member), fields(member = %member.display_name()))]
    async fn process_member(&self, mut member: Member, is_rollover: bool) -> MemberOutcome {
        if !self.membership.is_active(&member).await {
            info!("Member left the clan, removing");
            return match self.members.delete_member(*member.id()).await {
                Ok(()) => MemberOutcome::Removed,
                Err(e) => {
                    error!(error = %e, "Failed to delete member");
                    MemberOutcome::Failed(e.into())
                }
            };
        }

        let reading = match self.xp.read_xp(&member).await {
            Ok(Some(reading)) => reading,
            Ok(None) => return MemberOutcome::NoReading,
            Err(e) if e.is_lookup() => {
                warn!(error = %e, "XP lookup rejected");
                return MemberOutcome::LookupFailed(e);
            }
            Err(e) => {
                warn!(error = %e, "XP read failed");
                return MemberOutcome::Failed(e.into());
            }
        };

        match self
            .updater
            .apply_reading(&mut member, reading, is_rollover)
            .await
        {
            Ok(effect) => MemberOutcome::Updated(effect),
            Err(e) => {
                error!(error = %e, "Failed to store XP reading");
                MemberOutcome::Failed(e.into())
            }
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("notifies", &self.notifier.is_some())
            .finish_non_exhaustive()
    }
}
