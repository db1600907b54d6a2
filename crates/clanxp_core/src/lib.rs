//! Core domain types for clanxp.
//!
//! A [`Member`] is created the first time its account id shows up in the
//! roster feed, has its XP fields advanced by each reconciliation cycle, and
//! is deleted as soon as the clan service reports it inactive.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod member;
mod roster;

pub use member::{Member, MemberBuilder, MemberBuilderError, NewMember, ReadingEffect};
pub use roster::{MembershipStatus, RosterRecord};
