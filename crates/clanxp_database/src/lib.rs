//! Member storage for clanxp.
//!
//! The tracker talks to storage only through [`MemberRepository`] and
//! [`DisplayMessageRepository`]. [`PgMemberRepository`] and
//! [`PgDisplayMessageRepository`] persist to PostgreSQL via Diesel; the
//! in-memory variants back tests and dry runs.

#![warn(missing_docs)]

mod connection;
mod in_memory;
mod models;
mod postgres;
mod repository;
mod schema;

pub use clanxp_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
pub use connection::{MIGRATIONS, PgPool, create_pool, establish_connection, run_migrations};
pub use in_memory::{InMemoryDisplayMessageRepository, InMemoryMemberRepository};
pub use models::{
    DisplayMessage, DisplayMessageRow, MemberChangeset, MemberRow, NewDisplayMessageRow,
    NewMemberRow,
};
pub use postgres::{PgDisplayMessageRepository, PgMemberRepository};
pub use repository::{DisplayMessageRepository, MemberRepository};
