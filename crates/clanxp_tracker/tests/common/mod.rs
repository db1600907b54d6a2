//! Fakes for the tracker's collaborators.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDateTime;
use clanxp_api::{ActivitySink, MembershipValidator, RosterFeed, RosterSource, XpReader};
use clanxp_core::{Member, MembershipStatus, NewMember, RosterRecord};
use clanxp_database::{DisplayMessage, InMemoryMemberRepository, MemberRepository};
use clanxp_error::{HttpError, HttpResult};
use clanxp_leaderboard::Leaderboard;
use clanxp_tracker::{LeaderboardPublisher, Notifier};
use std::collections::HashMap;
use std::sync::Mutex;

pub fn record(nickname: &str, external_id: &str, messaging_id: Option<i64>) -> RosterRecord {
    RosterRecord::new(nickname.to_string(), external_id.to_string(), messaging_id)
}

pub async fn seed(repo: &InMemoryMemberRepository, external_id: &str, name: &str) -> Member {
    repo.insert_member(&NewMember::new(
        external_id.to_string(),
        name.to_string(),
        Some(1),
    ))
    .await
    .unwrap()
}

pub async fn seed_with_xp(
    repo: &InMemoryMemberRepository,
    external_id: &str,
    name: &str,
    baseline: i64,
    current: i64,
) -> Member {
    let member = seed(repo, external_id, name).await.with_xp(baseline, current);
    repo.save_member(&member).await.unwrap();
    member
}

/// Serves a fixed roster.
pub struct FakeRoster {
    pub feed: Mutex<RosterFeed>,
}

impl FakeRoster {
    pub fn new(records: Vec<RosterRecord>) -> Self {
        Self {
            feed: Mutex::new(RosterFeed::new(records, 0)),
        }
    }
}

#[async_trait]
impl RosterSource for FakeRoster {
    async fn fetch_roster(&self) -> HttpResult<RosterFeed> {
        Ok(self.feed.lock().unwrap().clone())
    }
}

/// Answers membership checks from a table; unknown ids are active.
#[derive(Default)]
pub struct FakeMembership {
    pub statuses: HashMap<String, MembershipStatus>,
}

impl FakeMembership {
    pub fn with(mut self, external_id: &str, status: MembershipStatus) -> Self {
        self.statuses.insert(external_id.to_string(), status);
        self
    }
}

#[async_trait]
impl MembershipValidator for FakeMembership {
    async fn membership_status(&self, external_id: &str) -> MembershipStatus {
        self.statuses
            .get(external_id)
            .copied()
            .unwrap_or(MembershipStatus::Active)
    }
}

/// Scripted XP readings keyed by display name.
#[derive(Default)]
pub struct FakeXp {
    pub readings: HashMap<String, HttpResult<Option<i64>>>,
}

impl FakeXp {
    pub fn reading(mut self, name: &str, xp: i64) -> Self {
        self.readings.insert(name.to_string(), Ok(Some(xp)));
        self
    }

    pub fn malformed(mut self, name: &str) -> Self {
        self.readings.insert(name.to_string(), Ok(None));
        self
    }

    pub fn failing(mut self, name: &str, error: HttpError) -> Self {
        self.readings.insert(name.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl XpReader for FakeXp {
    async fn read_xp(&self, member: &Member) -> HttpResult<Option<i64>> {
        self.readings
            .get(member.display_name().as_str())
            .cloned()
            .unwrap_or(Ok(Some(0)))
    }
}

/// Records uploads; fails for listed account ids.
#[derive(Default)]
pub struct RecordingSink {
    pub uploads: Mutex<Vec<(String, i64, NaiveDateTime)>>,
    pub failing: Vec<String>,
}

#[async_trait]
impl ActivitySink for RecordingSink {
    async fn upload_activity(
        &self,
        external_id: &str,
        delta: i64,
        timestamp: NaiveDateTime,
    ) -> HttpResult<()> {
        if self.failing.iter().any(|id| id == external_id) {
            return Err(HttpError::transport("Server disconnected"));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((external_id.to_string(), delta, timestamp));
        Ok(())
    }
}

/// Collects notified display names.
#[derive(Default)]
pub struct RecordingNotifier {
    pub names: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn identity_change_suspected(&self, display_name: &str, _error: &HttpError) {
        self.names.lock().unwrap().push(display_name.to_string());
    }
}

/// Records published boards and answers with a fixed message id.
pub struct RecordingPublisher {
    pub published: Mutex<Vec<(String, usize)>>,
    pub message_id: Option<i64>,
}

#[async_trait]
impl LeaderboardPublisher for RecordingPublisher {
    async fn publish(
        &self,
        target: &DisplayMessage,
        board: &Leaderboard,
    ) -> HttpResult<Option<i64>> {
        self.published
            .lock()
            .unwrap()
            .push((target.tag().clone(), board.entry_count()));
        Ok(self.message_id)
    }
}
