//! Connection settings for the external services.

use clanxp_error::ConfigError;
use derive_getters::Getters;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Check that `value` is an absolute URL that can take path segments.
fn check_base_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::new(format!("{} is not a valid URL: {}", field, e)))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::new(format!("{} cannot be a base URL", field)));
    }
    Ok(())
}

/// HTTP basic credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct BasicAuth {
    /// User name
    username: String,
    /// Password
    password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Clan management service: roster feed, membership checks and activity
/// uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClanServiceConfig {
    /// Base URL, e.g. `http://cv.thepenguinarmy.de`
    base_url: String,
    /// Basic auth user
    #[serde(default)]
    username: String,
    /// Basic auth password
    #[serde(default)]
    password: String,
    /// Game the clan plays
    #[serde(default = "default_game_id")]
    game_id: u32,
    /// Account type that keys roster records and membership checks
    #[serde(default = "default_account_type")]
    account_type: String,
    /// Account type holding the messaging identity
    #[serde(default = "default_messaging_account_type")]
    messaging_account_type: String,
}

fn default_game_id() -> u32 {
    1
}

fn default_account_type() -> String {
    "Ubisoft".to_string()
}

fn default_messaging_account_type() -> String {
    "Discord".to_string()
}

impl ClanServiceConfig {
    /// Settings with default game and account types.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            game_id: default_game_id(),
            account_type: default_account_type(),
            messaging_account_type: default_messaging_account_type(),
        }
    }

    /// Credentials for the service.
    pub fn basic_auth(&self) -> BasicAuth {
        BasicAuth::new(self.username.clone(), self.password.clone())
    }

    /// Absolute URL of a `BotRequest` endpoint.
    pub fn endpoint(&self, name: &str) -> String {
        format!("{}/BotRequest/{}", self.base_url.trim_end_matches('/'), name)
    }
}

/// Stats tracker service that reports cumulative XP.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct TrackerServiceConfig {
    /// Base URL
    #[serde(default = "default_tracker_base_url")]
    base_url: String,
    /// Value of the `TRN-Api-Key` header
    #[serde(default)]
    api_key: String,
    /// Statuses that fail a lookup instead of returning the body
    #[serde(default = "default_lookup_failure_statuses")]
    lookup_failure_statuses: Vec<u16>,
}

fn default_tracker_base_url() -> String {
    "https://public-api.tracker.gg".to_string()
}

/// Statuses treated as a failed lookup unless configured otherwise.
pub fn default_lookup_failure_statuses() -> Vec<u16> {
    vec![400, 404, 500]
}

impl TrackerServiceConfig {
    /// Settings with the default failure statuses.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            lookup_failure_statuses: default_lookup_failure_statuses(),
        }
    }

    /// Reject a base URL that request paths cannot be joined onto.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_base_url("tracker_service.base_url", &self.base_url)
    }
}

impl Default for TrackerServiceConfig {
    fn default() -> Self {
        Self::new(default_tracker_base_url(), String::new())
    }
}

impl std::fmt::Debug for TrackerServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerServiceConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("lookup_failure_statuses", &self.lookup_failure_statuses)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clan_service_defaults() {
        let config: ClanServiceConfig =
            serde_json::from_str(r#"{"base_url": "http://clan.test/"}"#).unwrap();
        assert_eq!(*config.game_id(), 1);
        assert_eq!(config.account_type(), "Ubisoft");
        assert_eq!(config.messaging_account_type(), "Discord");
        assert_eq!(
            config.endpoint("AllMember"),
            "http://clan.test/BotRequest/AllMember"
        );
    }

    #[test]
    fn malformed_tracker_url_fails_validation() {
        let err = TrackerServiceConfig::new("not a url", "key")
            .validate()
            .unwrap_err();
        assert!(err.message.contains("tracker_service.base_url"));

        let err = TrackerServiceConfig::new("mailto:ops@example.test", "key")
            .validate()
            .unwrap_err();
        assert!(err.message.contains("cannot be a base"));

        assert!(TrackerServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn api_key_is_not_printed() {
        let config = TrackerServiceConfig::new("https://tracker.test", "secret-key");
        assert!(!format!("{:?}", config).contains("secret-key"));
        assert_eq!(config.lookup_failure_statuses(), &vec![400, 404, 500]);
    }
}
