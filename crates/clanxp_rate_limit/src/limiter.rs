//! Fixed-window rate limiter shared by every outbound call site.
//!
//! The limiter keeps a call counter and the instant the current window
//! started. Once the counter reaches the quota, callers are suspended until
//! the window has run out, at which point the counter resets.
//!
//! Because the window is fixed rather than sliding, a burst at the end of
//! one window followed by a burst at the start of the next can start up to
//! twice the quota in a short span. That is accepted behaviour.

use crate::{RateLimitError, RateLimitErrorKind};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

/// Quota applied by a [`RateLimiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct RateLimitConfig {
    /// Maximum number of calls started per window
    #[serde(default = "default_calls")]
    calls: u32,
    /// Window length in seconds
    #[serde(default = "default_period_secs")]
    period_secs: u64,
}

fn default_calls() -> u32 {
    20
}

fn default_period_secs() -> u64 {
    60
}

impl RateLimitConfig {
    /// Create a quota of `calls` per `period_secs` seconds.
    pub fn new(calls: u32, period_secs: u64) -> Self {
        Self { calls, period_secs }
    }

    /// Window length as a [`Duration`].
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(default_calls(), default_period_secs())
    }
}

/// Counter state for the current window.
#[derive(Debug)]
struct Window {
    num_calls: u32,
    last_reset: Instant,
}

/// Fixed-window rate limiter.
///
/// One instance is meant to be shared (behind an `Arc`) by every client that
/// talks to the same external API. The counter is guarded by an async mutex
/// that stays held while a caller waits out a full window, so concurrent
/// tasks sharing a limiter are admitted strictly one after another and the
/// counter update cannot race.
///
/// # Example
///
/// ```rust,no_run
/// use clanxp_rate_limit::{RateLimitConfig, RateLimiter};
///
/// # async fn demo() -> Result<(), clanxp_rate_limit::RateLimitError> {
/// let limiter = RateLimiter::new(RateLimitConfig::new(20, 60))?;
/// let body = limiter.run(async { "response" }).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    window: Mutex<Window>,
}

impl RateLimiter {
    /// Create a limiter for the given quota.
    ///
    /// # Errors
    ///
    /// Returns an error if the quota allows zero calls or has a zero-length
    /// window.
    pub fn new(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        if config.calls == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::ZeroCalls));
        }
        if config.period_secs == 0 {
            return Err(RateLimitError::new(RateLimitErrorKind::ZeroPeriod));
        }

        Ok(Self {
            config,
            window: Mutex::new(Window {
                num_calls: 0,
                last_reset: Instant::now(),
            }),
        })
    }

    /// Quota enforced by this limiter.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until the quota admits one more call, then count it.
    #[instrument(skip(self), fields(calls = self.config.calls, period_secs = self.config.period_secs))]
    pub async fn acquire(&self) {
        let period = self.config.period();
        let mut window = self.window.lock().await;

        if window.num_calls >= self.config.calls {
            let remaining = period.saturating_sub(window.last_reset.elapsed());
            if !remaining.is_zero() {
                debug!(
                    wait_ms = remaining.as_millis() as u64,
                    "Quota exhausted, waiting for window to close"
                );
                tokio::time::sleep(remaining).await;
            }
        }

        if period.saturating_sub(window.last_reset.elapsed()).is_zero() {
            window.num_calls = 0;
            window.last_reset = Instant::now();
            debug!("Rate limit window reset");
        }

        window.num_calls += 1;
        debug!(num_calls = window.num_calls, "Call admitted");
    }

    /// Run `operation` once the quota admits it.
    pub async fn run<F, T>(&self, operation: F) -> T
    where
        F: Future<Output = T>,
    {
        self.acquire().await;
        operation.await
    }

    /// Calls counted in the current window.
    pub async fn calls_in_window(&self) -> u32 {
        self.window.lock().await.num_calls
    }
}
