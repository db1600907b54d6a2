//! HTTP contract tests for the service clients.

use chrono::NaiveDate;
use clanxp_api::{
    ActivityClient, ActivitySink, ClanServiceConfig, HttpFetcher, MembershipClient,
    MembershipValidator, RosterClient, RosterSource, TrackerServiceConfig, XpClient, XpReader,
};
use clanxp_core::{Member, MembershipStatus};
use clanxp_error::HttpErrorKind;
use clanxp_rate_limit::{RateLimitConfig, RateLimiter};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> HttpFetcher {
    let limiter = RateLimiter::new(RateLimitConfig::new(100, 60)).unwrap();
    HttpFetcher::new(Arc::new(limiter))
}

fn clan_config(server: &MockServer) -> ClanServiceConfig {
    ClanServiceConfig::new(server.uri(), "bot", "hunter2")
}

fn member(name: &str) -> Member {
    Member::builder()
        .id(1)
        .external_id("ubi-1")
        .display_name(name)
        .build()
        .unwrap()
}

#[tokio::test]
async fn roster_is_posted_with_game_selector_and_basic_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/BotRequest/AllMember"))
        .and(basic_auth("bot", "hunter2"))
        .and(body_json(json!({"gameId": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Ubisoft": {"nickname": "Frosty", "officialAccountId": "ubi-1"},
             "Discord": {"officialAccountId": 42}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = RosterClient::new(fetcher(), clan_config(&server));
    let feed = client.fetch_roster().await.unwrap();

    assert_eq!(feed.records().len(), 1);
    assert_eq!(feed.records()[0].nickname(), "Frosty");
    assert_eq!(*feed.records()[0].messaging_id(), Some(42));
}

#[tokio::test]
async fn membership_reports_inactive_member() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/BotRequest/Member"))
        .and(body_json(json!({"accountTypName": "Ubisoft", "officialAccountId": "ubi-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"Ubisoft": {"games": {"1": {"characters": {"Frosty": {"isMember": false}}}}}}
        ])))
        .mount(&server)
        .await;

    let client = MembershipClient::new(fetcher(), clan_config(&server));

    assert_eq!(
        client.membership_status("ubi-1").await,
        MembershipStatus::Inactive
    );
    assert!(!client.is_active(&member("Frosty")).await);
}

#[tokio::test]
async fn membership_fails_open_on_disconnect() {
    // Nothing listens on port 1, so the connection is refused.
    let config = ClanServiceConfig::new("http://127.0.0.1:1", "bot", "hunter2");
    let client = MembershipClient::new(fetcher(), config);

    assert_eq!(
        client.membership_status("ubi-1").await,
        MembershipStatus::Indeterminate
    );
    assert!(client.is_active(&member("Frosty")).await);
}

#[tokio::test]
async fn membership_fails_open_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = MembershipClient::new(fetcher(), clan_config(&server));
    assert!(client.is_active(&member("Frosty")).await);
}

#[tokio::test]
async fn xp_is_read_by_display_name_with_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/division-2/standard/profile/uplay/Frosty"))
        .and(header("TRN-Api-Key", "trn-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-RateLimit-Remaining-minute", "29")
                .set_body_json(json!({
                    "data": {"segments": [{"stats": {"xPClan": {"value": 31337}}}]}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = XpClient::new(fetcher(), TrackerServiceConfig::new(server.uri(), "trn-key"));
    assert_eq!(client.read_xp(&member("Frosty")).await.unwrap(), Some(31337));
}

#[tokio::test]
async fn xp_lookup_failure_carries_status_and_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = XpClient::new(fetcher(), TrackerServiceConfig::new(server.uri(), "trn-key"));
    let err = client.read_xp(&member("Renamed")).await.unwrap_err();

    match err.kind() {
        HttpErrorKind::Lookup { status, reason, url } => {
            assert_eq!(*status, 404);
            assert_eq!(reason, "Not Found");
            assert!(url.ends_with("/uplay/Renamed"));
        }
        other => panic!("expected lookup failure, got {:?}", other),
    }
}

#[tokio::test]
async fn unclassified_status_returns_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let fetched = fetcher().get(&server.uri(), &[]).await.unwrap();
    assert_eq!(fetched, "maintenance");

    let strict = fetcher().with_lookup_failure_statuses(vec![503]);
    assert!(strict.get(&server.uri(), &[]).await.unwrap_err().is_lookup());
}

#[tokio::test]
async fn malformed_profile_is_no_reading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = XpClient::new(fetcher(), TrackerServiceConfig::new(server.uri(), "trn-key"));
    assert_eq!(client.read_xp(&member("Frosty")).await.unwrap(), None);
}

#[tokio::test]
async fn activity_upload_sends_delta_and_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/BotRequest/Activity"))
        .and(basic_auth("bot", "hunter2"))
        .and(body_json(json!({
            "gameId": 1,
            "officialAccountId": "ubi-1",
            "accountTypName": "Ubisoft",
            "value": 250,
            "dateTime": "2025-01-16 10:00:00"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let at = NaiveDate::from_ymd_opt(2025, 1, 16)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let client = ActivityClient::new(fetcher(), clan_config(&server));
    client.upload_activity("ubi-1", 250, at).await.unwrap();
}
