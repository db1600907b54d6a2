//! Single outbound request with status classification.

use crate::{BasicAuth, default_lookup_failure_statuses};
use clanxp_error::{HttpError, HttpResult};
use clanxp_rate_limit::RateLimiter;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Header reporting the remaining per-minute quota of the tracker service.
pub const RATE_LIMIT_REMAINING_HEADER: &str = "X-RateLimit-Remaining-minute";

/// Performs rate-limited requests and classifies their outcome.
///
/// * `200` returns the body.
/// * A status in the lookup failure set fails with
///   [`HttpErrorKind::Lookup`](clanxp_error::HttpErrorKind::Lookup).
/// * Any other status is logged and its body returned uninterpreted.
/// * Connection problems fail with
///   [`HttpErrorKind::Transport`](clanxp_error::HttpErrorKind::Transport).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
    lookup_failure_statuses: Vec<u16>,
}

impl HttpFetcher {
    /// Create a fetcher with the default failure statuses.
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self {
            client: Client::new(),
            limiter,
            lookup_failure_statuses: default_lookup_failure_statuses(),
        }
    }

    /// Replace the set of statuses that fail a lookup.
    pub fn with_lookup_failure_statuses(mut self, statuses: Vec<u16>) -> Self {
        self.lookup_failure_statuses = statuses;
        self
    }

    /// Use a preconfigured reqwest client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Limiter shared by every request of this fetcher.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// GET `url` with extra headers.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails and a lookup error for
    /// a failure status.
    #[instrument(skip(self, headers))]
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> HttpResult<String> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.fetch(url, request).await
    }

    /// POST `body` as JSON to `url`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails and a lookup error for
    /// a failure status.
    #[instrument(skip(self, body, auth))]
    pub async fn post_json<B>(
        &self,
        url: &str,
        body: &B,
        auth: Option<&BasicAuth>,
    ) -> HttpResult<String>
    where
        B: Serialize + ?Sized,
    {
        let mut request = self.client.post(url).json(body);
        if let Some(auth) = auth {
            request = request.basic_auth(auth.username(), Some(auth.password()));
        }
        self.fetch(url, request).await
    }

    async fn fetch(&self, url: &str, request: RequestBuilder) -> HttpResult<String> {
        let response = self
            .limiter
            .run(request.send())
            .await
            .map_err(|e| {
                error!(url, error = ?e, "HTTP request failed");
                HttpError::transport(e.to_string())
            })?;

        let status = response.status();
        if let Some(remaining) = response.headers().get(RATE_LIMIT_REMAINING_HEADER) {
            debug!(remaining = ?remaining, "Rate limit remaining");
        }

        if self.lookup_failure_statuses.contains(&status.as_u16()) {
            let reason = status.canonical_reason().unwrap_or("Unknown");
            error!(url, status = status.as_u16(), reason, "Lookup failed");
            return Err(HttpError::lookup(status.as_u16(), reason, url));
        }

        let body = response.text().await.map_err(|e| {
            error!(url, error = ?e, "Failed to read response body");
            HttpError::transport(format!("Failed to read body: {}", e))
        })?;

        if status != StatusCode::OK {
            warn!(url, status = status.as_u16(), body = %body, "Unexpected status, returning body");
        }

        Ok(body)
    }
}
