//! End-to-end job tests against in-memory stores and fake services.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use clanxp::{ClanXp, ClanXpConfig, Job, Services};
use clanxp_api::{ActivitySink, MembershipValidator, RosterFeed, RosterSource, XpReader};
use clanxp_core::{Member, MembershipStatus, RosterRecord};
use clanxp_database::{
    DisplayMessage, InMemoryDisplayMessageRepository, InMemoryMemberRepository, MemberRepository,
};
use clanxp_error::HttpResult;
use clanxp_leaderboard::{Leaderboard, LeaderboardLimit};
use clanxp_tracker::LeaderboardPublisher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const CONFIG: &str = r#"
[clan_service]
base_url = "http://cv.example.test"

[[leaderboard.boards]]
tag = "member_clan_xp"
limit = 10
"#;

struct Roster(Vec<RosterRecord>);

#[async_trait]
impl RosterSource for Roster {
    async fn fetch_roster(&self) -> HttpResult<RosterFeed> {
        Ok(RosterFeed::new(self.0.clone(), 0))
    }
}

struct Membership(Mutex<HashMap<String, MembershipStatus>>);

#[async_trait]
impl MembershipValidator for Membership {
    async fn membership_status(&self, external_id: &str) -> MembershipStatus {
        self.0
            .lock()
            .unwrap()
            .get(external_id)
            .copied()
            .unwrap_or(MembershipStatus::Active)
    }
}

struct Xp(Mutex<HashMap<String, i64>>);

#[async_trait]
impl XpReader for Xp {
    async fn read_xp(&self, member: &Member) -> HttpResult<Option<i64>> {
        Ok(self.0.lock().unwrap().get(member.display_name()).copied())
    }
}

#[derive(Default)]
struct Uploads(Mutex<Vec<(String, i64)>>);

#[async_trait]
impl ActivitySink for Uploads {
    async fn upload_activity(
        &self,
        external_id: &str,
        delta: i64,
        _timestamp: NaiveDateTime,
    ) -> HttpResult<()> {
        self.0.lock().unwrap().push((external_id.to_string(), delta));
        Ok(())
    }
}

#[derive(Default)]
struct Boards(Mutex<Vec<String>>);

#[async_trait]
impl LeaderboardPublisher for Boards {
    async fn publish(
        &self,
        _target: &DisplayMessage,
        board: &Leaderboard,
    ) -> HttpResult<Option<i64>> {
        self.0.lock().unwrap().push(board.to_string());
        Ok(Some(1))
    }
}

struct Harness {
    app: ClanXp,
    members: Arc<InMemoryMemberRepository>,
    membership: Arc<Membership>,
    xp: Arc<Xp>,
    uploads: Arc<Uploads>,
    boards: Arc<Boards>,
}

fn harness() -> Harness {
    let members = Arc::new(InMemoryMemberRepository::new());
    let membership = Arc::new(Membership(Mutex::new(HashMap::new())));
    let xp = Arc::new(Xp(Mutex::new(HashMap::new())));
    let uploads = Arc::new(Uploads::default());
    let boards = Arc::new(Boards::default());

    let roster = Roster(vec![
        RosterRecord::new("Frosty".into(), "ubi-1".into(), Some(101)),
        RosterRecord::new("Sleet_Storm".into(), "ubi-2".into(), Some(102)),
        RosterRecord::new("Hail".into(), "ubi-3".into(), None),
    ]);

    let services = Services {
        roster: Arc::new(roster),
        membership: membership.clone(),
        xp: xp.clone(),
        activity: uploads.clone(),
        publisher: boards.clone(),
    };
    let app = ClanXp::assemble(
        ClanXpConfig::from_toml(CONFIG).unwrap(),
        members.clone(),
        Arc::new(InMemoryDisplayMessageRepository::new()),
        services,
    );

    Harness {
        app,
        members,
        membership,
        xp,
        uploads,
        boards,
    }
}

impl Harness {
    fn set_xp(&self, name: &str, xp: i64) {
        self.xp.0.lock().unwrap().insert(name.to_string(), xp);
    }
}

#[tokio::test]
async fn weekly_flow() {
    let h = harness();

    let sync = h.app.sync_roster().await.unwrap();
    assert_eq!(*sync.created(), 3);

    // First cycle seeds baselines
    h.set_xp("Frosty", 10_000);
    h.set_xp("Sleet_Storm", 20_000);
    h.set_xp("Hail", 5_000);
    h.app.run_job(Job::Cycle).await.unwrap();

    // Progress during the week
    h.set_xp("Frosty", 12_500);
    h.set_xp("Sleet_Storm", 20_400);
    h.app.run_job(Job::Cycle).await.unwrap();

    h.app.register_board("member_clan_xp", 900).await.unwrap();
    let published = h.app.publish_leaderboards(None).await.unwrap();
    assert_eq!(*published.published(), 1);
    {
        let boards = h.boards.0.lock().unwrap();
        assert!(boards[0].contains("**1.** <@101> (Frosty)\n2.500"));
        assert!(boards[0].contains("**2.** <@102> (Sleet\\_Storm)\n400"));
        assert!(!boards[0].contains("Hail"));
    }

    let upload = h.app.upload_deltas().await.unwrap();
    assert_eq!(*upload.uploaded(), 2);
    assert_eq!(*upload.skipped(), 1);

    h.app.run_job(Job::Rollover).await.unwrap();
    for member in h.members.list_members().await.unwrap() {
        assert_eq!(member.weekly_gain(), 0);
    }
    assert_eq!(h.uploads.0.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn departed_member_is_removed_by_cycle() {
    let h = harness();
    h.app.sync_roster().await.unwrap();

    h.membership
        .0
        .lock()
        .unwrap()
        .insert("ubi-2".to_string(), MembershipStatus::Inactive);
    let report = h.app.run_cycle(false).await.unwrap();

    assert_eq!(report.removed(), 1);
    assert!(h.members.find_by_external_id("ubi-2").await.unwrap().is_none());
}

#[tokio::test]
async fn limit_override_applies_to_every_board() {
    let h = harness();
    h.app.sync_roster().await.unwrap();
    h.app.register_board("member_clan_xp", 900).await.unwrap();

    h.app
        .publish_leaderboards(Some(LeaderboardLimit::All))
        .await
        .unwrap();

    let boards = h.boards.0.lock().unwrap();
    assert!(boards[0].contains("Total"));
}

#[tokio::test]
async fn serve_stops_on_shutdown() {
    let h = harness();
    h.app.serve(async {}).await.unwrap();
}
