//! HTTP error types.
//!
//! Outbound calls fail when the connection itself broke (`Transport`), the
//! body could not be decoded (`Decode`), or the service answered with a
//! status that marks the lookup as failed (`Lookup`). A request URL that
//! cannot be built from the configured base is `InvalidUrl`.

/// Classification of an outbound HTTP failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum HttpErrorKind {
    /// Connection-level failure (refused, reset, server disconnected).
    #[display("Transport failure: {_0}")]
    Transport(String),
    /// Response body was not the expected JSON.
    #[display("Decode failure: {_0}")]
    Decode(String),
    /// The configured base URL cannot carry the request path.
    #[display("Invalid URL: {_0}")]
    InvalidUrl(String),
    /// The service answered with an explicit error status.
    #[display("HTTP statuscode {status}, reason: {reason} for {url}")]
    Lookup {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase for the status
        reason: String,
        /// Requested URL
        url: String,
    },
}

/// HTTP error with source location.
#[derive(Debug, Clone)]
pub struct HttpError {
    /// The kind of failure
    pub kind: HttpErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl HttpError {
    /// Create a new HttpError of the given kind at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use clanxp_error::{HttpError, HttpErrorKind};
    ///
    /// let err = HttpError::new(HttpErrorKind::Transport("Connection reset".into()));
    /// assert!(err.to_string().contains("Connection reset"));
    /// ```
    #[track_caller]
    pub fn new(kind: HttpErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a transport failure.
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Transport(message.into()))
    }

    /// Shorthand for a decode failure.
    #[track_caller]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Decode(message.into()))
    }

    /// Shorthand for an unusable request URL.
    #[track_caller]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::InvalidUrl(message.into()))
    }

    /// Shorthand for a lookup failure.
    #[track_caller]
    pub fn lookup(status: u16, reason: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Lookup {
            status,
            reason: reason.into(),
            url: url.into(),
        })
    }

    /// Get the error kind.
    pub fn kind(&self) -> &HttpErrorKind {
        &self.kind
    }

    /// Whether the service explicitly rejected the lookup.
    pub fn is_lookup(&self) -> bool {
        matches!(self.kind, HttpErrorKind::Lookup { .. })
    }

    /// Whether the connection itself failed.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, HttpErrorKind::Transport(_))
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "HTTP Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for HttpError {}
