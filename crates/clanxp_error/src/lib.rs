//! Error types for the clanxp workspace.
//!
//! Each concern has its own location-tracked error struct. `ClanXpError`
//! wraps them for call sites that cross concerns, such as the binary.

#![warn(missing_docs)]

mod config;
mod database;
mod http;

pub use config::ConfigError;
pub use database::{DatabaseError, DatabaseErrorKind};
pub use http::{HttpError, HttpErrorKind};

/// Result type for database operations.
pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

/// Result type for outbound HTTP operations.
pub type HttpResult<T> = std::result::Result<T, HttpError>;

/// Crate-level error variants.
#[derive(Debug, derive_more::From)]
pub enum ClanXpErrorKind {
    /// HTTP error
    Http(HttpError),
    /// Database error
    Database(DatabaseError),
    /// Configuration error
    Config(ConfigError),
}

impl std::fmt::Display for ClanXpErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClanXpErrorKind::Http(e) => write!(f, "{}", e),
            ClanXpErrorKind::Database(e) => write!(f, "{}", e),
            ClanXpErrorKind::Config(e) => write!(f, "{}", e),
        }
    }
}

/// clanxp error with kind discrimination.
#[derive(Debug)]
pub struct ClanXpError(Box<ClanXpErrorKind>);

impl ClanXpError {
    /// Create a new error from a kind.
    pub fn new(kind: ClanXpErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ClanXpErrorKind {
        &self.0
    }
}

impl std::fmt::Display for ClanXpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "clanxp Error: {}", self.0)
    }
}

impl std::error::Error for ClanXpError {}

impl<T> From<T> for ClanXpError
where
    T: Into<ClanXpErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for clanxp operations.
pub type ClanXpResult<T> = std::result::Result<T, ClanXpError>;
