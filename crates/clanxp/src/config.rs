//! Application configuration.
//!
//! Loaded from a TOML file layered with `CLANXP__` environment variables,
//! e.g. `CLANXP__TRACKER_SERVICE__API_KEY`.

use clanxp_api::{ClanServiceConfig, TrackerServiceConfig};
use clanxp_error::ConfigError;
use clanxp_leaderboard::LeaderboardConfig;
use clanxp_rate_limit::RateLimitConfig;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

use crate::ScheduleConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "CLANXP";

/// Log output layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// PostgreSQL settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct DatabaseConfig {
    /// Connection URL, falls back to `DATABASE_URL`
    #[serde(default)]
    url: Option<String>,
    /// Maximum pooled connections
    #[serde(default = "default_pool_size")]
    pool_size: u32,
}

fn default_pool_size() -> u32 {
    4
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: default_pool_size(),
        }
    }
}

impl DatabaseConfig {
    /// The configured URL or `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns an error if neither is set.
    pub fn resolve_url(&self) -> Result<String, ConfigError> {
        self.url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .ok_or_else(|| ConfigError::new("database.url or DATABASE_URL must be set"))
    }
}

/// Operational notification switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct NotificationConfig {
    /// Warn when a tracker lookup suggests a member renamed themselves
    #[serde(default)]
    identity_change_warnings: bool,
}

/// Complete clanxp configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ClanXpConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    log_level: String,
    /// Log output layout
    #[serde(default)]
    log_format: LogFormat,
    /// Member store
    #[serde(default)]
    database: DatabaseConfig,
    /// Roster, membership and activity service
    clan_service: ClanServiceConfig,
    /// XP tracker service
    #[serde(default)]
    tracker_service: TrackerServiceConfig,
    /// Quota shared by all outbound calls
    #[serde(default)]
    rate_limit: RateLimitConfig,
    /// Leaderboard rendering and boards
    #[serde(default)]
    leaderboard: LeaderboardConfig,
    /// Operational notifications
    #[serde(default)]
    notifications: NotificationConfig,
    /// Job triggers for `serve`
    #[serde(default)]
    schedule: ScheduleConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ClanXpConfig {
    /// Load `path` (optional) overlaid with `CLANXP__*` environment
    /// variables. A `.env` file is read first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a required setting is
    /// missing or malformed.
    #[instrument(name = "config.load")]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            debug!(path = ?env_file, "Loaded .env");
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to read configuration: {}", e)))?;

        Self::from_config(settings)
    }

    /// Parse configuration from a TOML string, without environment overlay.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid configuration.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        Self::from_config(settings)
    }

    fn from_config(settings: config::Config) -> Result<Self, ConfigError> {
        let config: Self = settings
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that deserialization alone cannot.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clan_service.base_url().is_empty() {
            return Err(ConfigError::new("clan_service.base_url must not be empty"));
        }
        if *self.rate_limit.calls() == 0 || *self.rate_limit.period_secs() == 0 {
            return Err(ConfigError::new(
                "rate_limit.calls and rate_limit.period_secs must be positive",
            ));
        }
        self.tracker_service.validate()?;
        if *self.leaderboard.anchor().hour() > 23 {
            return Err(ConfigError::new("leaderboard.anchor.hour must be 0 to 23"));
        }
        self.schedule.validate()
    }
}
