#![allow(clippy::unwrap_used)]
// Integration tests for `SnapshotSource` and the view adapters, driven by
// in-memory fetchers under paused time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tokio::time::sleep;

use unipoll_api::legacy::models::{LegacyClientEntry, LegacyWlanConf};
use unipoll_core::{
    AccessPointAdapter, AccessPointView, CancellationToken, Client, ClientAdapter, ClientView,
    ControllerSnapshot, CoreError, SnapshotFetcher, SnapshotSource, Wlan, WlanAdapter, WlanView,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TTL: Duration = Duration::from_secs(30);
const REFRESH_TIMEOUT: Duration = Duration::from_secs(20);

fn client(mac: &str) -> Client {
    let entry: LegacyClientEntry =
        serde_json::from_value(json!({ "_id": mac, "mac": mac, "essid": "home" })).unwrap();
    Client::from(entry)
}

fn wlan(name: &str) -> Wlan {
    let conf: LegacyWlanConf =
        serde_json::from_value(json!({ "_id": name, "name": name, "enabled": true })).unwrap();
    Wlan::from(conf)
}

fn snapshot_with_clients(macs: &[&str]) -> ControllerSnapshot {
    let mut snapshot = ControllerSnapshot::empty(Utc::now());
    snapshot.clients = macs.iter().map(|m| client(m)).collect();
    snapshot.wlans = vec![wlan("home")].into();
    snapshot
}

/// Counts calls, sleeps `delay`, then returns whatever `outcome` builds.
struct FakeFetcher {
    calls: AtomicUsize,
    delay: Duration,
    outcome: Box<dyn Fn(usize) -> Result<ControllerSnapshot, CoreError> + Send + Sync>,
}

impl FakeFetcher {
    fn new(
        delay: Duration,
        outcome: impl Fn(usize) -> Result<ControllerSnapshot, CoreError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            outcome: Box::new(outcome),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotFetcher for FakeFetcher {
    async fn fetch(&self) -> Result<ControllerSnapshot, CoreError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        sleep(self.delay).await;
        (self.outcome)(call)
    }
}

fn source_for(fetcher: Arc<dyn SnapshotFetcher>) -> Arc<SnapshotSource> {
    Arc::new(SnapshotSource::new(
        fetcher,
        TTL,
        REFRESH_TIMEOUT,
        CancellationToken::new(),
    ))
}

// ── Fan-out ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn all_views_share_one_fetch() {
    let fetcher = FakeFetcher::new(Duration::from_millis(50), |_| {
        Ok(snapshot_with_clients(&["aa:bb:cc:00:00:01", "aa:bb:cc:00:00:02"]))
    });
    let source = source_for(fetcher.clone());

    let clients = ClientAdapter::new(Arc::clone(&source));
    let aps = AccessPointAdapter::new(Arc::clone(&source));
    let wlans = WlanAdapter::new(Arc::clone(&source));
    let cancel = CancellationToken::new();

    let (c, r, a, w, h) = tokio::join!(
        clients.clients(&cancel),
        clients.roam_history(&cancel),
        aps.access_points(&cancel),
        wlans.wlans(&cancel),
        wlans.health(&cancel),
    );

    assert_eq!(c.unwrap().len(), 2);
    assert!(r.unwrap().is_empty());
    assert!(a.unwrap().is_empty());
    assert_eq!(w.unwrap()[0].name, "home");
    assert!(h.unwrap().is_empty());
    assert_eq!(fetcher.calls(), 1);

    // Still inside the TTL: nothing refetches.
    aps.radios(&cancel).await.unwrap();
    aps.bsses(&cancel).await.unwrap();
    clients.classifications(&cancel).await.unwrap();
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn views_return_the_same_shared_collection() {
    let fetcher = FakeFetcher::new(Duration::ZERO, |_| {
        Ok(snapshot_with_clients(&["aa:bb:cc:00:00:01"]))
    });
    let source = source_for(fetcher);
    let cancel = CancellationToken::new();

    let first = ClientAdapter::new(Arc::clone(&source))
        .clients(&cancel)
        .await
        .unwrap();
    let second = ClientAdapter::new(Arc::clone(&source))
        .clients(&cancel)
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test(start_paused = true)]
async fn ttl_expiry_and_invalidate_trigger_refetch() {
    let fetcher = FakeFetcher::new(Duration::ZERO, |call| {
        let mac = format!("aa:bb:cc:00:00:{call:02}");
        Ok(snapshot_with_clients(&[mac.as_str()]))
    });
    let source = source_for(fetcher.clone());
    let view = ClientAdapter::new(Arc::clone(&source));
    let cancel = CancellationToken::new();

    view.clients(&cancel).await.unwrap();
    tokio::time::advance(TTL).await;
    let clients = view.clients(&cancel).await.unwrap();
    assert_eq!(clients[0].mac.as_str(), "aa:bb:cc:00:00:02");

    source.invalidate();
    assert!(source.cached().is_none());
    let clients = view.clients(&cancel).await.unwrap();
    assert_eq!(clients[0].mac.as_str(), "aa:bb:cc:00:00:03");
    assert_eq!(fetcher.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn zero_ttl_fans_out_one_fetch_per_round() {
    let fetcher = FakeFetcher::new(Duration::from_millis(50), |_| {
        Ok(snapshot_with_clients(&["aa:bb:cc:00:00:01"]))
    });
    let source = Arc::new(SnapshotSource::new(
        fetcher.clone(),
        Duration::ZERO,
        REFRESH_TIMEOUT,
        CancellationToken::new(),
    ));

    let clients = ClientAdapter::new(Arc::clone(&source));
    let aps = AccessPointAdapter::new(Arc::clone(&source));
    let wlans = WlanAdapter::new(Arc::clone(&source));
    let cancel = CancellationToken::new();

    let (c, a, w, h) = tokio::join!(
        clients.clients(&cancel),
        aps.access_points(&cancel),
        wlans.wlans(&cancel),
        wlans.health(&cancel),
    );
    assert_eq!(c.unwrap().len(), 1);
    assert!(a.unwrap().is_empty());
    assert_eq!(w.unwrap().len(), 1);
    assert!(h.unwrap().is_empty());
    assert_eq!(fetcher.calls(), 1);

    // Nothing stays fresh: the next round fetches again, once.
    assert!(source.cached().is_none());
    let (c, w) = tokio::join!(clients.clients(&cancel), wlans.wlans(&cancel));
    c.unwrap();
    w.unwrap();
    assert_eq!(fetcher.calls(), 2);
}

// ── Failure handling ────────────────────────────────────────────────

/// Assembles a snapshot from sub-resource futures; `fail_clients` breaks
/// the client collection while every other sub-resource succeeds.
struct SubResourceFetcher {
    fail_clients: AtomicBool,
}

#[async_trait]
impl SnapshotFetcher for SubResourceFetcher {
    async fn fetch(&self) -> Result<ControllerSnapshot, CoreError> {
        let fail = self.fail_clients.load(Ordering::SeqCst);
        let clients = async move {
            if fail {
                Err(CoreError::Api {
                    message: "stat/sta: HTTP 500".into(),
                    status: Some(500),
                })
            } else {
                Ok(vec![client("aa:bb:cc:00:00:01")])
            }
        };
        let wlans = async { Ok::<_, CoreError>(vec![wlan("home"), wlan("iot")]) };

        let (clients, wlans) = tokio::try_join!(clients, wlans)?;

        let mut snapshot = ControllerSnapshot::empty(Utc::now());
        snapshot.clients = clients.into();
        snapshot.wlans = wlans.into();
        Ok(snapshot)
    }
}

#[tokio::test(start_paused = true)]
async fn failing_sub_resource_stores_nothing() {
    let fetcher = Arc::new(SubResourceFetcher {
        fail_clients: AtomicBool::new(true),
    });
    let source = source_for(fetcher.clone());
    let wlans = WlanAdapter::new(Arc::clone(&source));
    let cancel = CancellationToken::new();

    let err = wlans.wlans(&cancel).await.unwrap_err();
    assert!(matches!(err, CoreError::Api { status: Some(500), .. }));
    assert!(source.cached().is_none());
    assert!(source.age().is_none());

    fetcher.fail_clients.store(false, Ordering::SeqCst);
    assert_eq!(wlans.wlans(&cancel).await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_refresh_keeps_previous_snapshot() {
    let fetcher = FakeFetcher::new(Duration::ZERO, |call| {
        if call == 1 {
            Ok(snapshot_with_clients(&["aa:bb:cc:00:00:01"]))
        } else {
            Err(CoreError::AuthenticationFailed {
                message: "bad password".into(),
            })
        }
    });
    let source = source_for(fetcher);
    let view = ClientAdapter::new(Arc::clone(&source));
    let cancel = CancellationToken::new();

    let before = source.get_cached_data(&cancel).await.unwrap();
    tokio::time::advance(TTL + Duration::from_secs(1)).await;

    let err = view.clients(&cancel).await.unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));

    // The old snapshot is still there, stale; a longer TTL makes it visible.
    source.set_ttl(Duration::from_secs(3600));
    let after = source.cached().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

// ── Cancellation, timeout, shutdown ─────────────────────────────────

#[tokio::test(start_paused = true)]
async fn caller_cancellation_does_not_abort_shared_refresh() {
    let fetcher = FakeFetcher::new(Duration::from_secs(5), |_| {
        Ok(snapshot_with_clients(&["aa:bb:cc:00:00:01"]))
    });
    let source = source_for(fetcher.clone());

    let impatient = CancellationToken::new();
    let patient = CancellationToken::new();

    let waiter = {
        let source = Arc::clone(&source);
        let patient = patient.clone();
        tokio::spawn(async move { source.get_cached_data(&patient).await })
    };

    let cancel_soon = impatient.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(1)).await;
        cancel_soon.cancel();
    });

    let err = source.get_cached_data(&impatient).await.unwrap_err();
    assert!(matches!(err, CoreError::Cancelled));
    assert!(err.is_cancellation());

    let snapshot = waiter.await.unwrap().unwrap();
    assert_eq!(snapshot.clients.len(), 1);
    assert!(source.cached().is_some());
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_hits_refresh_timeout() {
    let fetcher = FakeFetcher::new(REFRESH_TIMEOUT * 2, |_| {
        Ok(snapshot_with_clients(&[]))
    });
    let source = source_for(fetcher);

    let err = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Timeout { timeout_secs: 20 }));
    assert!(source.cached().is_none());
}

#[tokio::test(start_paused = true)]
async fn shutdown_aborts_in_flight_refresh() {
    let fetcher = FakeFetcher::new(Duration::from_secs(10), |_| {
        Ok(snapshot_with_clients(&[]))
    });
    let shutdown = CancellationToken::new();
    let source = SnapshotSource::new(fetcher, TTL, REFRESH_TIMEOUT, shutdown.clone());

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let err = source
        .get_cached_data(&CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ShuttingDown));
    assert!(source.cached().is_none());
}

#[tokio::test(start_paused = true)]
async fn ttl_is_adjustable_at_runtime() {
    let fetcher = FakeFetcher::new(Duration::ZERO, |_| Ok(snapshot_with_clients(&[])));
    let source = source_for(fetcher.clone());
    let cancel = CancellationToken::new();

    source.get_cached_data(&cancel).await.unwrap();
    tokio::time::advance(Duration::from_secs(10)).await;

    source.set_ttl(Duration::from_secs(5));
    assert_eq!(source.ttl(), Duration::from_secs(5));
    assert!(source.cached().is_none());

    source.set_ttl(Duration::from_secs(60));
    assert!(source.cached().is_some());
    assert_eq!(source.age(), Some(Duration::from_secs(10)));
    assert_eq!(fetcher.calls(), 1);
}
