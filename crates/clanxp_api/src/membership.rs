//! Membership checks against the clan service.

use crate::{ClanServiceConfig, HttpFetcher};
use async_trait::async_trait;
use clanxp_core::{Member, MembershipStatus};
use serde_json::{Value, json};
use tracing::{error, instrument, warn};

/// Answers whether a tracked member still belongs to the clan.
#[async_trait]
pub trait MembershipValidator: Send + Sync {
    /// Three-valued membership status for an account id.
    ///
    /// Implementations never fail: anything short of an explicit answer is
    /// [`MembershipStatus::Indeterminate`].
    async fn membership_status(&self, external_id: &str) -> MembershipStatus;

    /// Fail-open check: only an explicit "not a member" answer is inactive.
    async fn is_active(&self, member: &Member) -> bool {
        self.membership_status(member.external_id())
            .await
            .is_active_fail_open()
    }
}

/// Queries the clan service's `Member` endpoint.
#[derive(Debug, Clone)]
pub struct MembershipClient {
    fetcher: HttpFetcher,
    config: ClanServiceConfig,
}

impl MembershipClient {
    /// Create a client.
    pub fn new(fetcher: HttpFetcher, config: ClanServiceConfig) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl MembershipValidator for MembershipClient {
    #[instrument(skip(self))]
    async fn membership_status(&self, external_id: &str) -> MembershipStatus {
        let payload = json!({
            "accountTypName": self.config.account_type(),
            "officialAccountId": external_id,
        });

        let body = match self
            .fetcher
            .post_json(
                &self.config.endpoint("Member"),
                &payload,
                Some(&self.config.basic_auth()),
            )
            .await
        {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Membership check failed, keeping member");
                return MembershipStatus::Indeterminate;
            }
        };

        parse_membership(&body, self.config.account_type(), *self.config.game_id())
    }
}

/// Extract the membership flag from a `Member` response body.
///
/// The flag sits at
/// `[0][account_type].games[game_id].characters.<first>.isMember`.
pub fn parse_membership(body: &str, account_type: &str, game_id: u32) -> MembershipStatus {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "Membership response is not JSON");
            return MembershipStatus::Indeterminate;
        }
    };

    let flag = value
        .get(0)
        .and_then(|entry| entry.get(account_type))
        .and_then(|account| account.get("games"))
        .and_then(|games| games.get(game_id.to_string()))
        .and_then(|game| game.get("characters"))
        .and_then(Value::as_object)
        .and_then(|characters| characters.values().next())
        .and_then(|character| character.get("isMember"))
        .and_then(Value::as_bool);

    match flag {
        Some(is_member) => MembershipStatus::from(is_member),
        None => {
            error!("Membership flag missing from response");
            MembershipStatus::Indeterminate
        }
    }
}
