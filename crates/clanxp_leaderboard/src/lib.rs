//! Weekly clan XP leaderboard.
//!
//! [`LeaderboardRenderer`] ranks members by their gain in the current
//! [`TrackingWindow`] and splits them into pages of ten for the messaging
//! client. Everything here is pure; publishing lives in the tracker.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod format;
mod render;
mod window;

pub use config::{BoardConfig, LeaderboardConfig, LeaderboardLimit};
pub use format::{escape_markdown, format_thousands};
pub use render::{
    FOOTER_FORMAT, Leaderboard, LeaderboardBlock, LeaderboardEntry, LeaderboardRenderer, PAGE_SIZE,
};
pub use window::{TrackingWindow, WINDOW_DATE_FORMAT, WeeklyAnchor, tracking_window};

impl From<&LeaderboardConfig> for LeaderboardRenderer {
    fn from(config: &LeaderboardConfig) -> Self {
        LeaderboardRenderer::new(
            config.title().clone(),
            *config.anchor(),
            *config.thousands_separator(),
        )
    }
}
