//! Roster feed entries and membership check outcomes.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One entry from the external roster feed.
///
/// Only used during reconciliation; never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct RosterRecord {
    /// In-game nickname
    nickname: String,
    /// Stable game account id
    external_id: String,
    /// Messaging-system identity, when the member linked one
    messaging_id: Option<i64>,
}

/// Outcome of asking the clan service whether a member is still active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum MembershipStatus {
    /// The service confirmed the membership
    #[display("active")]
    Active,
    /// The service reported the member as gone
    #[display("inactive")]
    Inactive,
    /// No usable answer (network failure, missing flag, malformed body)
    #[display("indeterminate")]
    Indeterminate,
}

impl MembershipStatus {
    /// Fail-open reading: only an explicit `Inactive` counts as inactive.
    ///
    /// Deleting a member is irreversible, so missing or degraded data keeps
    /// the member.
    pub fn is_active_fail_open(self) -> bool {
        !matches!(self, MembershipStatus::Inactive)
    }
}

impl From<bool> for MembershipStatus {
    fn from(is_member: bool) -> Self {
        if is_member {
            MembershipStatus::Active
        } else {
            MembershipStatus::Inactive
        }
    }
}
