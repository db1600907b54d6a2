//! Weekly activity uploads to the clan service.

use crate::{ClanServiceConfig, HttpFetcher};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use clanxp_error::HttpResult;
use serde::Serialize;
use tracing::{debug, instrument};

/// Timestamp layout expected by the activity endpoint.
pub const ACTIVITY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Receives computed XP deltas.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    /// Report `delta` for one account.
    async fn upload_activity(
        &self,
        external_id: &str,
        delta: i64,
        timestamp: NaiveDateTime,
    ) -> HttpResult<()>;
}

/// JSON body of an activity upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload<'a> {
    /// Game id
    pub game_id: u32,
    /// Game account id
    pub official_account_id: &'a str,
    /// Account type of `official_account_id`
    pub account_typ_name: &'a str,
    /// XP gained
    pub value: i64,
    /// Local time of the upload
    pub date_time: String,
}

/// Posts deltas to the clan service's `Activity` endpoint.
#[derive(Debug, Clone)]
pub struct ActivityClient {
    fetcher: HttpFetcher,
    config: ClanServiceConfig,
}

impl ActivityClient {
    /// Create a client.
    pub fn new(fetcher: HttpFetcher, config: ClanServiceConfig) -> Self {
        Self { fetcher, config }
    }
}

#[async_trait]
impl ActivitySink for ActivityClient {
    #[instrument(skip(self))]
    async fn upload_activity(
        &self,
        external_id: &str,
        delta: i64,
        timestamp: NaiveDateTime,
    ) -> HttpResult<()> {
        let payload = ActivityPayload {
            game_id: *self.config.game_id(),
            official_account_id: external_id,
            account_typ_name: self.config.account_type(),
            value: delta,
            date_time: timestamp.format(ACTIVITY_TIMESTAMP_FORMAT).to_string(),
        };

        self.fetcher
            .post_json(
                &self.config.endpoint("Activity"),
                &payload,
                Some(&self.config.basic_auth()),
            )
            .await?;
        debug!("Uploaded activity");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn payload_uses_service_field_names() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let payload = ActivityPayload {
            game_id: 1,
            official_account_id: "ubi-1",
            account_typ_name: "Ubisoft",
            value: 250,
            date_time: at.format(ACTIVITY_TIMESTAMP_FORMAT).to_string(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["gameId"], 1);
        assert_eq!(json["officialAccountId"], "ubi-1");
        assert_eq!(json["accountTypName"], "Ubisoft");
        assert_eq!(json["value"], 250);
        assert_eq!(json["dateTime"], "2025-01-09 10:00:00");
    }
}
