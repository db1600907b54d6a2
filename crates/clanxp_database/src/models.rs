//! Diesel models for the members and display_messages tables.

use chrono::NaiveDateTime;
use clanxp_core::{Member, NewMember};
use derive_getters::Getters;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Database row for the members table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MemberRow {
    /// Row id
    pub id: i32,
    /// Stable account id from the roster feed
    pub external_id: String,
    /// In-game name
    pub display_name: String,
    /// Messaging-system identity
    pub messaging_id: Option<i64>,
    /// Cumulative XP at window start
    pub xp_baseline: i64,
    /// Latest cumulative XP reading
    pub xp_current: i64,
    /// Row creation time
    pub created_at: NaiveDateTime,
    /// Last modification time
    pub updated_at: NaiveDateTime,
}

impl From<MemberRow> for Member {
    fn from(row: MemberRow) -> Self {
        NewMember::new(row.external_id, row.display_name, row.messaging_id)
            .into_member(row.id)
            .with_xp(row.xp_baseline, row.xp_current)
    }
}

/// Insertable struct for the members table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::members)]
pub struct NewMemberRow<'a> {
    /// Stable account id
    pub external_id: &'a str,
    /// In-game name
    pub display_name: &'a str,
    /// Messaging-system identity
    pub messaging_id: Option<i64>,
    /// Starting baseline
    pub xp_baseline: i64,
    /// Starting reading
    pub xp_current: i64,
}

impl<'a> From<&'a NewMember> for NewMemberRow<'a> {
    fn from(member: &'a NewMember) -> Self {
        Self {
            external_id: member.external_id(),
            display_name: member.display_name(),
            messaging_id: *member.messaging_id(),
            xp_baseline: *member.xp_baseline(),
            xp_current: *member.xp_current(),
        }
    }
}

/// Mutable columns written back when a member is saved.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::members)]
#[diesel(treat_none_as_null = true)]
pub struct MemberChangeset<'a> {
    /// In-game name
    pub display_name: &'a str,
    /// Messaging-system identity
    pub messaging_id: Option<i64>,
    /// Cumulative XP at window start
    pub xp_baseline: i64,
    /// Latest cumulative XP reading
    pub xp_current: i64,
    /// Modification time
    pub updated_at: NaiveDateTime,
}

impl<'a> MemberChangeset<'a> {
    /// Changeset reflecting the member's current fields.
    pub fn of(member: &'a Member, updated_at: NaiveDateTime) -> Self {
        Self {
            display_name: member.display_name(),
            messaging_id: *member.messaging_id(),
            xp_baseline: *member.xp_baseline(),
            xp_current: *member.xp_current(),
            updated_at,
        }
    }
}

/// A message in the messaging client that shows a leaderboard.
///
/// The tag names which board the message shows; the message id is empty
/// until the first message has been sent to the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_new::new)]
pub struct DisplayMessage {
    /// Row id
    id: i32,
    /// Board tag, e.g. `member_clan_xp`
    tag: String,
    /// Channel the board is shown in
    channel_id: i64,
    /// Message to edit, if one was sent already
    message_id: Option<i64>,
}

/// Database row for the display_messages table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::display_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DisplayMessageRow {
    /// Row id
    pub id: i32,
    /// Board tag
    pub tag: String,
    /// Channel id
    pub channel_id: i64,
    /// Message id
    pub message_id: Option<i64>,
    /// Last modification time
    pub updated_at: NaiveDateTime,
}

impl From<DisplayMessageRow> for DisplayMessage {
    fn from(row: DisplayMessageRow) -> Self {
        DisplayMessage::new(row.id, row.tag, row.channel_id, row.message_id)
    }
}

/// Insertable struct for the display_messages table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::display_messages)]
pub struct NewDisplayMessageRow<'a> {
    /// Board tag
    pub tag: &'a str,
    /// Channel id
    pub channel_id: i64,
}
