//! Operational notifications.

use async_trait::async_trait;
use clanxp_error::HttpError;
use tracing::warn;

/// Receives operational warnings raised during a cycle.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The tracker rejected a lookup by display name, which usually means
    /// the member renamed themselves in game.
    async fn identity_change_suspected(&self, display_name: &str, error: &HttpError);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn identity_change_suspected(&self, display_name: &str, error: &HttpError) {
        warn!(
            member = display_name,
            error = %error,
            "Warning: {} possibly changed their name",
            display_name
        );
    }
}
