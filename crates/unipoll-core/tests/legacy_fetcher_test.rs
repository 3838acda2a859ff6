#![allow(clippy::unwrap_used)]
// End-to-end tests for `LegacyFetcher` behind a `SnapshotSource`, against a
// wiremock controller.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unipoll_api::{ControllerPlatform, LegacyClient};
use unipoll_core::{
    CancellationToken, CoreError, LegacyFetcher, RadioBand, SnapshotFetcher, SnapshotSettings,
    SnapshotSource,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn site_path(suffix: &str) -> String {
    format!("/api/s/default/{suffix}")
}

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

fn fetcher(server: &MockServer) -> LegacyFetcher {
    let client = LegacyClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "default".into(),
        ControllerPlatform::ClassicController,
    );
    LegacyFetcher::with_client(
        client,
        "exporter".into(),
        "secret".to_string().into(),
        SnapshotSettings::default(),
    )
}

fn source(server: &MockServer) -> Arc<SnapshotSource> {
    Arc::new(SnapshotSource::new(
        Arc::new(fetcher(server)),
        Duration::from_secs(30),
        Duration::from_secs(10),
        CancellationToken::new(),
    ))
}

async fn mount_login(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(times)
        .mount(server)
        .await;
}

async fn mount_get(server: &MockServer, suffix: &str, data: Value) {
    Mock::given(method("GET"))
        .and(path(site_path(suffix)))
        .respond_with(ok(data))
        .mount(server)
        .await;
}

async fn mount_healthy_controller(server: &MockServer) {
    mount_get(
        server,
        "stat/sta",
        json!([
            { "_id": "s1", "mac": "aa:bb:cc:00:00:01", "essid": "home", "radio": "na", "signal": -60 },
            { "_id": "s2", "mac": "aa:bb:cc:00:00:02", "is_wired": true }
        ]),
    )
    .await;
    mount_get(
        server,
        "rest/user",
        json!([{ "_id": "u1", "mac": "aa:bb:cc:00:00:01", "dev_cat": 1 }]),
    )
    .await;
    mount_get(
        server,
        "stat/device",
        json!([
            {
                "_id": "d1", "mac": "f0:9f:c2:00:00:01", "type": "uap", "name": "Hallway", "state": 1,
                "radio_table": [{ "name": "wifi0", "radio": "ng" }, { "name": "wifi1", "radio": "na" }],
                "vap_table": [{ "bssid": "f2:9f:c2:00:00:01", "essid": "home", "radio": "na" }]
            },
            { "_id": "d2", "mac": "f0:9f:c2:00:00:02", "type": "ugw", "name": "Gateway" }
        ]),
    )
    .await;
    mount_get(
        server,
        "rest/wlanconf",
        json!([{ "_id": "w1", "name": "home", "wlan_bands": ["2g", "5g"] }]),
    )
    .await;
    mount_get(
        server,
        "stat/health",
        json!([{ "subsystem": "wlan", "status": "ok", "num_ap": 1 }]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path(site_path("stat/event")))
        .respond_with(ok(json!([
            { "_id": "e1", "key": "EVT_WU_Roam", "user": "aa:bb:cc:00:00:01", "ap_from": "f0:9f:c2:00:00:02", "ap_to": "f0:9f:c2:00:00:01" },
            { "_id": "e2", "key": "EVT_WU_Disconnected", "user": "aa:bb:cc:00:00:02" }
        ])))
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn collects_a_complete_snapshot() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_healthy_controller(&server).await;

    let source = source(&server);
    let snapshot = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.clients.len(), 2);
    assert_eq!(snapshot.classifications.len(), 1);
    assert_eq!(snapshot.access_points.len(), 1);
    assert_eq!(snapshot.access_points[0].display_name(), "Hallway");
    assert_eq!(snapshot.radios.len(), 2);
    assert_eq!(snapshot.bsses[0].band, RadioBand::Band5G);
    assert_eq!(snapshot.wlans[0].bands.len(), 2);
    assert_eq!(snapshot.health.len(), 1);
    assert_eq!(snapshot.roam_history.len(), 1);
}

#[tokio::test]
async fn cached_snapshot_is_served_without_new_requests() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;
    mount_healthy_controller(&server).await;

    let source = source(&server);
    let cancel = CancellationToken::new();
    source.get_cached_data(&cancel).await.unwrap();
    let first_round = server.received_requests().await.unwrap().len();

    for _ in 0..5 {
        source.get_cached_data(&cancel).await.unwrap();
    }

    assert_eq!(server.received_requests().await.unwrap().len(), first_round);
}

#[tokio::test]
async fn failing_client_endpoint_fails_whole_refresh() {
    let server = MockServer::start().await;
    mount_login(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/sta")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;
    mount_healthy_controller(&server).await;

    let source = source(&server);
    let err = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::Api { status: Some(500), .. }),
        "unexpected error: {err:?}"
    );
    assert!(source.cached().is_none());
    assert!(source.age().is_none());
}

#[tokio::test]
async fn expired_session_triggers_one_relogin() {
    let server = MockServer::start().await;
    mount_login(&server, 2).await;

    // First device listing says the session is gone; afterwards it works.
    Mock::given(method("GET"))
        .and(path(site_path("stat/device")))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_healthy_controller(&server).await;

    let source = source(&server);
    let snapshot = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(snapshot.access_points.len(), 1);
}

#[tokio::test]
async fn persistent_auth_failure_is_reported() {
    let server = MockServer::start().await;
    mount_login(&server, 2).await;

    Mock::given(method("GET"))
        .and(path(site_path("stat/device")))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    mount_healthy_controller(&server).await;

    let source = source(&server);
    let err = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, CoreError::AuthenticationFailed { .. }),
        "unexpected error: {err:?}"
    );
}

#[tokio::test]
async fn rejected_login_fails_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("api.err.Invalid"))
        .expect(1)
        .mount(&server)
        .await;

    let source = source(&server);
    let err = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
}

// ── Sign-out ────────────────────────────────────────────────────────

#[tokio::test]
async fn sign_out_ends_an_open_session_once() {
    let server = MockServer::start().await;
    mount_login(&server, 2).await;
    mount_healthy_controller(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher(&server);
    fetcher.fetch().await.unwrap();

    fetcher.sign_out().await;
    fetcher.sign_out().await;

    // The next fetch opens a fresh session.
    fetcher.fetch().await.unwrap();
}

#[tokio::test]
async fn sign_out_without_session_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    fetcher(&server).sign_out().await;
}
