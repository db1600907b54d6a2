//! Reconciliation cycle tests.

mod common;

use clanxp_core::MembershipStatus;
use clanxp_database::{InMemoryMemberRepository, MemberRepository};
use clanxp_error::HttpError;
use clanxp_tracker::{MemberOutcome, Orchestrator};
use common::{FakeMembership, FakeXp, RecordingNotifier, seed, seed_with_xp};
use std::sync::Arc;

fn orchestrator(
    repo: &Arc<InMemoryMemberRepository>,
    membership: FakeMembership,
    xp: FakeXp,
) -> Orchestrator {
    Orchestrator::new(repo.clone(), Arc::new(membership), Arc::new(xp))
}

#[tokio::test]
async fn first_reading_seeds_baseline() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed(&repo, "ubi-1", "Frosty").await;

    let xp = FakeXp::default().reading("Frosty", 500);
    let report = orchestrator(&repo, FakeMembership::default(), xp)
        .run_cycle(false)
        .await
        .unwrap();

    assert_eq!(report.updated(), 1);
    let member = repo.find_by_external_id("ubi-1").await.unwrap().unwrap();
    assert_eq!(*member.xp_baseline(), 500);
    assert_eq!(*member.xp_current(), 500);
    assert_eq!(member.weekly_gain(), 0);
}

#[tokio::test]
async fn later_reading_accumulates_gain() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed_with_xp(&repo, "ubi-1", "Frosty", 500, 500).await;

    let xp = FakeXp::default().reading("Frosty", 700);
    orchestrator(&repo, FakeMembership::default(), xp)
        .run_cycle(false)
        .await
        .unwrap();

    let member = repo.find_by_external_id("ubi-1").await.unwrap().unwrap();
    assert_eq!(*member.xp_baseline(), 500);
    assert_eq!(member.weekly_gain(), 200);
}

#[tokio::test]
async fn rollover_closes_window_unless_reading_is_zero() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed_with_xp(&repo, "ubi-1", "Frosty", 500, 700).await;
    seed_with_xp(&repo, "ubi-2", "Sleet", 500, 700).await;

    let xp = FakeXp::default().reading("Frosty", 700).reading("Sleet", 0);
    let report = orchestrator(&repo, FakeMembership::default(), xp)
        .run_cycle(true)
        .await
        .unwrap();

    assert!(*report.is_rollover());
    assert_eq!(report.rolled_over(), 1);

    let frosty = repo.find_by_external_id("ubi-1").await.unwrap().unwrap();
    assert_eq!(*frosty.xp_baseline(), 700);
    assert_eq!(frosty.weekly_gain(), 0);

    let sleet = repo.find_by_external_id("ubi-2").await.unwrap().unwrap();
    assert_eq!(*sleet.xp_baseline(), 500);
}

#[tokio::test]
async fn inactive_member_is_deleted_without_reading() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed(&repo, "ubi-1", "Frosty").await;
    seed(&repo, "ubi-2", "Sleet").await;

    let membership = FakeMembership::default().with("ubi-1", MembershipStatus::Inactive);
    let report = orchestrator(&repo, membership, FakeXp::default().reading("Sleet", 10))
        .run_cycle(false)
        .await
        .unwrap();

    assert_eq!(report.removed(), 1);
    assert!(repo.find_by_external_id("ubi-1").await.unwrap().is_none());
    assert!(repo.find_by_external_id("ubi-2").await.unwrap().is_some());
}

#[tokio::test]
async fn indeterminate_membership_keeps_member() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed(&repo, "ubi-1", "Frosty").await;

    let membership = FakeMembership::default().with("ubi-1", MembershipStatus::Indeterminate);
    let report = orchestrator(&repo, membership, FakeXp::default().reading("Frosty", 42))
        .run_cycle(false)
        .await
        .unwrap();

    assert_eq!(report.removed(), 0);
    assert_eq!(report.updated(), 1);
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn lookup_failure_is_isolated_and_notified() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed_with_xp(&repo, "ubi-1", "Renamed", 100, 100).await;
    seed_with_xp(&repo, "ubi-2", "Sleet", 100, 100).await;

    let xp = FakeXp::default()
        .failing("Renamed", HttpError::lookup(404, "Not Found", "http://tracker/uplay/Renamed"))
        .reading("Sleet", 300);
    let notifier = Arc::new(RecordingNotifier::default());
    let report = orchestrator(&repo, FakeMembership::default(), xp)
        .with_notifier(notifier.clone())
        .run_cycle(false)
        .await
        .unwrap();

    assert_eq!(report.lookup_failures().count(), 1);
    assert_eq!(report.updated(), 1);
    assert_eq!(*notifier.names.lock().unwrap(), vec!["Renamed".to_string()]);

    let sleet = repo.find_by_external_id("ubi-2").await.unwrap().unwrap();
    assert_eq!(sleet.weekly_gain(), 200);
}

#[tokio::test]
async fn lookup_failure_without_notifier_only_reports() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed(&repo, "ubi-1", "Renamed").await;

    let xp = FakeXp::default().failing("Renamed", HttpError::lookup(400, "Bad Request", "u"));
    let report = orchestrator(&repo, FakeMembership::default(), xp)
        .run_cycle(false)
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert!(matches!(
        report.members()[0].outcome(),
        MemberOutcome::LookupFailed(_)
    ));
}

#[tokio::test]
async fn transport_and_decode_failures_do_not_abort_cycle() {
    let repo = Arc::new(InMemoryMemberRepository::new());
    seed_with_xp(&repo, "ubi-1", "Flaky", 100, 150).await;
    seed_with_xp(&repo, "ubi-2", "Garbled", 100, 150).await;
    seed_with_xp(&repo, "ubi-3", "Steady", 100, 150).await;

    let xp = FakeXp::default()
        .failing("Flaky", HttpError::transport("Server disconnected"))
        .malformed("Garbled")
        .reading("Steady", 400);
    let notifier = Arc::new(RecordingNotifier::default());
    let report = orchestrator(&repo, FakeMembership::default(), xp)
        .with_notifier(notifier.clone())
        .run_cycle(false)
        .await
        .unwrap();

    assert_eq!(report.failed(), 1);
    assert_eq!(report.no_reading(), 1);
    assert_eq!(report.updated(), 1);
    assert!(notifier.names.lock().unwrap().is_empty());

    let garbled = repo.find_by_external_id("ubi-2").await.unwrap().unwrap();
    assert_eq!(*garbled.xp_current(), 150);
}
