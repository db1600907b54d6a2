//! Cumulative XP readings from the stats tracker.

use crate::{HttpFetcher, TrackerServiceConfig};
use async_trait::async_trait;
use clanxp_core::Member;
use clanxp_error::{HttpError, HttpResult};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error, instrument};

/// Header carrying the tracker API key.
pub const API_KEY_HEADER: &str = "TRN-Api-Key";

/// Reads a member's current cumulative XP.
#[async_trait]
pub trait XpReader: Send + Sync {
    /// Current reading, or `None` when the response could not be decoded.
    ///
    /// A profile without XP data reads as zero.
    ///
    /// # Errors
    ///
    /// Lookup and transport failures are returned to the caller.
    async fn read_xp(&self, member: &Member) -> HttpResult<Option<i64>>;
}

/// Reads clan XP from the tracker's profile endpoint.
#[derive(Debug, Clone)]
pub struct XpClient {
    fetcher: HttpFetcher,
    config: TrackerServiceConfig,
}

impl XpClient {
    /// Create a client.
    pub fn new(fetcher: HttpFetcher, config: TrackerServiceConfig) -> Self {
        Self { fetcher, config }
    }

    /// Profile URL for a display name.
    ///
    /// # Errors
    ///
    /// Returns [`HttpErrorKind::InvalidUrl`](clanxp_error::HttpErrorKind::InvalidUrl)
    /// if the base URL cannot carry a path.
    pub fn profile_url(&self, display_name: &str) -> HttpResult<Url> {
        let mut url = Url::parse(self.config.base_url())
            .map_err(|e| HttpError::invalid_url(format!("tracker URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| HttpError::invalid_url("tracker URL cannot be a base"))?
            .pop_if_empty()
            .extend(["v2", "division-2", "standard", "profile", "uplay", display_name]);
        Ok(url)
    }
}

#[async_trait]
impl XpReader for XpClient {
    #[instrument(skip(self, member), fields(member = %member.display_name()))]
    async fn read_xp(&self, member: &Member) -> HttpResult<Option<i64>> {
        let url = self.profile_url(member.display_name())?;
        let body = self
            .fetcher
            .get(url.as_str(), &[(API_KEY_HEADER, self.config.api_key())])
            .await?;

        let reading = parse_clan_xp(&body);
        debug!(reading = ?reading, "Read clan XP");
        Ok(reading)
    }
}

/// Extract `data.segments[0].stats.xPClan.value` from a profile body.
///
/// Returns `None` for a body that is not JSON. Missing fields and `null`
/// read as zero; fractional values are truncated.
pub fn parse_clan_xp(body: &str) -> Option<i64> {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            error!(error = %e, "Profile response is not JSON");
            return None;
        }
    };

    let xp = value
        .pointer("/data/segments/0/stats/xPClan/value")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0);
    Some(xp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_value() {
        let body = r#"{"data": {"segments": [{"stats": {"xPClan": {"value": 1234567.0}}}]}}"#;
        assert_eq!(parse_clan_xp(body), Some(1_234_567));
    }

    #[test]
    fn absent_or_null_reads_zero() {
        assert_eq!(parse_clan_xp(r#"{"errors": []}"#), Some(0));
        assert_eq!(parse_clan_xp(r#"{"data": {"segments": []}}"#), Some(0));
        assert_eq!(
            parse_clan_xp(r#"{"data": {"segments": [{"stats": {"xPClan": {"value": null}}}]}}"#),
            Some(0)
        );
    }

    #[test]
    fn unusable_base_url_is_not_a_transport_failure() {
        let limiter = std::sync::Arc::new(
            clanxp_rate_limit::RateLimiter::new(clanxp_rate_limit::RateLimitConfig::default())
                .unwrap(),
        );
        let client = XpClient::new(
            HttpFetcher::new(limiter),
            TrackerServiceConfig::new("mailto:ops@example.test", "key"),
        );

        let err = client.profile_url("Frosty").unwrap_err();
        assert!(matches!(err.kind(), clanxp_error::HttpErrorKind::InvalidUrl(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn profile_url_escapes_name() {
        let limiter = std::sync::Arc::new(
            clanxp_rate_limit::RateLimiter::new(clanxp_rate_limit::RateLimitConfig::default())
                .unwrap(),
        );
        let client = XpClient::new(
            HttpFetcher::new(limiter),
            TrackerServiceConfig::new("https://tracker.test/", "key"),
        );

        let url = client.profile_url("Frosty Bear").unwrap();
        assert_eq!(
            url.as_str(),
            "https://tracker.test/v2/division-2/standard/profile/uplay/Frosty%20Bear"
        );
    }

    #[test]
    fn malformed_body_is_no_reading() {
        assert_eq!(parse_clan_xp("<html>busy</html>"), None);
    }
}
