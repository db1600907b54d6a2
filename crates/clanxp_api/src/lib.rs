//! Clients for the external services clanxp reconciles against.
//!
//! Every client sends its requests through an [`HttpFetcher`], which applies
//! the shared [`RateLimiter`](clanxp_rate_limit::RateLimiter) and turns
//! failure statuses into lookup errors. The tracker depends only on the
//! traits ([`RosterSource`], [`MembershipValidator`], [`XpReader`],
//! [`ActivitySink`]), so tests can swap in fakes.

#![warn(missing_docs)]

mod activity;
mod config;
mod fetcher;
mod membership;
mod roster;
mod xp;

pub use activity::{ACTIVITY_TIMESTAMP_FORMAT, ActivityClient, ActivityPayload, ActivitySink};
pub use config::{BasicAuth, ClanServiceConfig, TrackerServiceConfig, default_lookup_failure_statuses};
pub use fetcher::{HttpFetcher, RATE_LIMIT_REMAINING_HEADER};
pub use membership::{MembershipClient, MembershipValidator, parse_membership};
pub use roster::{RosterClient, RosterFeed, RosterSource, parse_roster};
pub use xp::{API_KEY_HEADER, XpClient, XpReader, parse_clan_xp};
