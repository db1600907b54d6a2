//! PostgreSQL-backed repositories.
//!
//! Diesel is synchronous, so every operation checks a connection out of the
//! pool inside `spawn_blocking`.

use crate::connection::PgPool;
use crate::models::{
    DisplayMessageRow, MemberChangeset, MemberRow, NewDisplayMessageRow, NewMemberRow,
};
use crate::schema::{display_messages, members};
use crate::{DisplayMessage, DisplayMessageRepository, MemberRepository};
use async_trait::async_trait;
use chrono::Utc;
use clanxp_core::{Member, NewMember};
use clanxp_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::{debug, instrument};

/// Run a blocking closure against a pooled connection.
async fn with_connection<T, F>(pool: &PgPool, f: F) -> DatabaseResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get()?;
        f(&mut conn)
    })
    .await
    .map_err(|e| DatabaseError::new(DatabaseErrorKind::Query(format!("Task join error: {}", e))))?
}

fn expect_one_row(affected: usize) -> DatabaseResult<()> {
    if affected == 0 {
        Err(DatabaseError::new(DatabaseErrorKind::NotFound))
    } else {
        Ok(())
    }
}

/// Member store backed by the `members` table.
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PgMemberRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgMemberRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn list_members(&self) -> DatabaseResult<Vec<Member>> {
        with_connection(&self.pool, |conn| {
            let rows = members::table
                .order(members::id.asc())
                .select(MemberRow::as_select())
                .load(conn)?;
            debug!(count = rows.len(), "Loaded members");
            Ok(rows.into_iter().map(Member::from).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<Member>> {
        let external_id = external_id.to_string();
        with_connection(&self.pool, move |conn| {
            let row = members::table
                .filter(members::external_id.eq(&external_id))
                .select(MemberRow::as_select())
                .first(conn)
                .optional()?;
            Ok(row.map(Member::from))
        })
        .await
    }

    #[instrument(skip(self, member), fields(external_id = %member.external_id()))]
    async fn insert_member(&self, member: &NewMember) -> DatabaseResult<Member> {
        let member = member.clone();
        with_connection(&self.pool, move |conn| {
            let row = diesel::insert_into(members::table)
                .values(NewMemberRow::from(&member))
                .returning(MemberRow::as_returning())
                .get_result(conn)?;
            debug!(id = row.id, "Inserted member");
            Ok(Member::from(row))
        })
        .await
    }

    #[instrument(skip(self, member), fields(id = *member.id()))]
    async fn save_member(&self, member: &Member) -> DatabaseResult<()> {
        let member = member.clone();
        with_connection(&self.pool, move |conn| {
            let affected = diesel::update(members::table.find(*member.id()))
                .set(MemberChangeset::of(&member, Utc::now().naive_utc()))
                .execute(conn)?;
            expect_one_row(affected)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete_member(&self, id: i32) -> DatabaseResult<()> {
        with_connection(&self.pool, move |conn| {
            let affected = diesel::delete(members::table.find(id)).execute(conn)?;
            expect_one_row(affected)
        })
        .await
    }
}

/// Display message index backed by the `display_messages` table.
#[derive(Clone)]
pub struct PgDisplayMessageRepository {
    pool: PgPool,
}

impl PgDisplayMessageRepository {
    /// Create a repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl std::fmt::Debug for PgDisplayMessageRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgDisplayMessageRepository")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DisplayMessageRepository for PgDisplayMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_tag(&self, tag: &str) -> DatabaseResult<Vec<DisplayMessage>> {
        let tag = tag.to_string();
        with_connection(&self.pool, move |conn| {
            let rows = display_messages::table
                .filter(display_messages::tag.eq(&tag))
                .order(display_messages::id.asc())
                .select(DisplayMessageRow::as_select())
                .load(conn)?;
            Ok(rows.into_iter().map(DisplayMessage::from).collect())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn register(&self, tag: &str, channel_id: i64) -> DatabaseResult<DisplayMessage> {
        let tag = tag.to_string();
        with_connection(&self.pool, move |conn| {
            let row = diesel::insert_into(display_messages::table)
                .values(NewDisplayMessageRow {
                    tag: &tag,
                    channel_id,
                })
                .returning(DisplayMessageRow::as_returning())
                .get_result(conn)?;
            Ok(DisplayMessage::from(row))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn record_message_id(&self, id: i32, message_id: i64) -> DatabaseResult<()> {
        with_connection(&self.pool, move |conn| {
            let affected = diesel::update(display_messages::table.find(id))
                .set((
                    display_messages::message_id.eq(Some(message_id)),
                    display_messages::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            expect_one_row(affected)
        })
        .await
    }
}
