//! Roster feed client.

use crate::{ClanServiceConfig, HttpFetcher};
use async_trait::async_trait;
use clanxp_core::RosterRecord;
use clanxp_error::{HttpError, HttpResult};
use derive_getters::Getters;
use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

/// Records parsed from one roster fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters, derive_new::new)]
pub struct RosterFeed {
    /// Usable records in feed order
    records: Vec<RosterRecord>,
    /// Entries dropped because a required field was missing
    skipped: usize,
}

impl RosterFeed {
    /// Take the records out of the feed.
    pub fn into_records(self) -> Vec<RosterRecord> {
        self.records
    }
}

/// Source of the full clan roster.
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Fetch the roster once.
    async fn fetch_roster(&self) -> HttpResult<RosterFeed>;
}

/// Reads the roster from the clan service's `AllMember` endpoint.
#[derive(Debug, Clone)]
pub struct RosterClient {
    fetcher: HttpFetcher,
    config: ClanServiceConfig,
}

impl RosterClient {
    /// Create a client.
    pub fn new(fetcher: HttpFetcher, config: ClanServiceConfig) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl RosterSource for RosterClient {
    #[instrument(skip(self))]
    async fn fetch_roster(&self) -> HttpResult<RosterFeed> {
        let body = self
            .fetcher
            .post_json(
                &self.config.endpoint("AllMember"),
                &json!({ "gameId": self.config.game_id() }),
                Some(&self.config.basic_auth()),
            )
            .await?;

        let feed = parse_roster(
            &body,
            self.config.account_type(),
            self.config.messaging_account_type(),
        )?;
        debug!(
            records = feed.records.len(),
            skipped = feed.skipped,
            "Fetched roster"
        );
        Ok(feed)
    }
}

/// Parse a roster response body.
///
/// Each entry is an object keyed by account type. The game account supplies
/// `nickname` and `officialAccountId`; the messaging account, when linked,
/// supplies its `officialAccountId` as a number or numeric string.
///
/// # Errors
///
/// Returns a decode error if the body is not a JSON array.
pub fn parse_roster(
    body: &str,
    account_type: &str,
    messaging_account_type: &str,
) -> HttpResult<RosterFeed> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| HttpError::decode(format!("Roster is not JSON: {}", e)))?;
    let entries = value
        .as_array()
        .ok_or_else(|| HttpError::decode("Roster is not a JSON array"))?;

    let mut feed = RosterFeed::default();
    for (index, entry) in entries.iter().enumerate() {
        let account = &entry[account_type];
        let nickname = account["nickname"].as_str();
        let external_id = id_as_string(&account["officialAccountId"]);

        match (nickname, external_id) {
            (Some(nickname), Some(external_id)) if !nickname.is_empty() => {
                let messaging_id =
                    id_as_i64(&entry[messaging_account_type]["officialAccountId"]);
                feed.records.push(RosterRecord::new(
                    nickname.to_string(),
                    external_id,
                    messaging_id,
                ));
            }
            _ => {
                warn!(index, "Skipping roster entry without nickname or account id");
                feed.skipped += 1;
            }
        }
    }
    Ok(feed)
}

fn id_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
