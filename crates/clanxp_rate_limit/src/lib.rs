//! Rate limiting for clanxp.
//!
//! The external clan and tracker services throttle callers per minute. A
//! single [`RateLimiter`] instance is shared by every client talking to the
//! same service.

#![warn(missing_docs)]

mod error;
mod limiter;

pub use error::{RateLimitError, RateLimitErrorKind};
pub use limiter::{RateLimitConfig, RateLimiter};
