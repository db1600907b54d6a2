//! In-memory repositories.
//!
//! Ordered storage behind a tokio `RwLock`, for tests and for wiring the
//! tracker without PostgreSQL. All data is lost when the repository is
//! dropped.

use crate::{DisplayMessage, DisplayMessageRepository, MemberRepository};
use async_trait::async_trait;
use clanxp_core::{Member, NewMember};
use clanxp_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemberTable {
    rows: BTreeMap<i32, Member>,
    next_id: i32,
}

impl MemberTable {
    fn check_unique(&self, id: Option<i32>, external_id: &str, display_name: &str) -> DatabaseResult<()> {
        for member in self.rows.values() {
            if Some(*member.id()) == id {
                continue;
            }
            if member.external_id() == external_id {
                return Err(DatabaseError::new(DatabaseErrorKind::UniqueViolation(
                    format!("external_id '{}' already stored", external_id),
                )));
            }
            if member.display_name() == display_name {
                return Err(DatabaseError::new(DatabaseErrorKind::UniqueViolation(
                    format!("display_name '{}' already stored", display_name),
                )));
            }
        }
        Ok(())
    }
}

/// In-memory member store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemberRepository {
    table: Arc<RwLock<MemberTable>>,
}

impl InMemoryMemberRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored members.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    /// Whether no member is stored.
    pub async fn is_empty(&self) -> bool {
        self.table.read().await.rows.is_empty()
    }
}

#[async_trait]
impl MemberRepository for InMemoryMemberRepository {
    async fn list_members(&self) -> DatabaseResult<Vec<Member>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_by_external_id(&self, external_id: &str) -> DatabaseResult<Option<Member>> {
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|m| m.external_id() == external_id)
            .cloned())
    }

    async fn insert_member(&self, member: &NewMember) -> DatabaseResult<Member> {
        let mut table = self.table.write().await;
        table.check_unique(None, member.external_id(), member.display_name())?;

        table.next_id += 1;
        let stored = member.clone().into_member(table.next_id);
        table.rows.insert(*stored.id(), stored.clone());
        Ok(stored)
    }

    async fn save_member(&self, member: &Member) -> DatabaseResult<()> {
        let mut table = self.table.write().await;
        if !table.rows.contains_key(member.id()) {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
        }
        table.check_unique(Some(*member.id()), member.external_id(), member.display_name())?;
        table.rows.insert(*member.id(), member.clone());
        Ok(())
    }

    async fn delete_member(&self, id: i32) -> DatabaseResult<()> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))
    }
}

/// In-memory display message index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDisplayMessageRepository {
    rows: Arc<RwLock<Vec<DisplayMessage>>>,
}

impl InMemoryDisplayMessageRepository {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DisplayMessageRepository for InMemoryDisplayMessageRepository {
    async fn find_by_tag(&self, tag: &str) -> DatabaseResult<Vec<DisplayMessage>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|m| m.tag() == tag)
            .cloned()
            .collect())
    }

    async fn register(&self, tag: &str, channel_id: i64) -> DatabaseResult<DisplayMessage> {
        let mut rows = self.rows.write().await;
        if rows
            .iter()
            .any(|m| m.tag() == tag && *m.channel_id() == channel_id)
        {
            return Err(DatabaseError::new(DatabaseErrorKind::UniqueViolation(
                format!("board '{}' already registered for channel {}", tag, channel_id),
            )));
        }

        let id = rows.len() as i32 + 1;
        let message = DisplayMessage::new(id, tag.to_string(), channel_id, None);
        rows.push(message.clone());
        Ok(message)
    }

    async fn record_message_id(&self, id: i32, message_id: i64) -> DatabaseResult<()> {
        let mut rows = self.rows.write().await;
        let slot = rows
            .iter_mut()
            .find(|m| *m.id() == id)
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        *slot = DisplayMessage::new(id, slot.tag().clone(), *slot.channel_id(), Some(message_id));
        Ok(())
    }
}
