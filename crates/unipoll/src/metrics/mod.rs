//! Prometheus collectors over the typed views.
//!
//! Each collector owns a set of gauge vectors in the exporter's private
//! registry. A scrape resets and refills them from its view, so series for
//! vanished clients or APs drop out on the next scrape. The views answer
//! from one snapshot pinned for the whole scrape.

mod access_points;
mod clients;
mod pinned;
mod wlans;

use std::sync::Arc;

use async_trait::async_trait;
use prometheus::{Gauge, GaugeVec, Opts, Registry, TextEncoder};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use unipoll_core::{
    AccessPointView, CancellationToken, ClientView, CoreError, SnapshotSource, WlanView,
};

use access_points::AccessPointCollector;
use clients::ClientCollector;
use pinned::ScrapeSnapshot;
use wlans::WlanCollector;

/// One group of series fed by one view.
#[async_trait]
pub trait ViewCollector: Send + Sync {
    /// Value of the `collector` label.
    fn name(&self) -> &'static str;

    /// Replace this collector's series with fresh values from its view.
    async fn collect(&self, cancel: &CancellationToken) -> Result<(), CoreError>;

    /// Drop every series this collector owns.
    fn clear(&self);
}

/// Registers a gauge vector with `registry` and returns a handle to it.
pub(crate) fn gauge_vec(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> Result<GaugeVec, prometheus::Error> {
    let vec = GaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub(crate) fn as_f64(value: u64) -> f64 {
    value as f64
}

pub(crate) fn label(value: Option<&String>) -> &str {
    value.map_or("", String::as_str)
}

pub(crate) fn flag(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

// ── Exporter ────────────────────────────────────────────────────────

/// All collectors plus exporter-level gauges, behind one registry.
pub struct Exporter {
    registry: Registry,
    clients: ClientCollector,
    access_points: AccessPointCollector,
    wlans: WlanCollector,
    collector_up: GaugeVec,
    cache_age: Gauge,
    cache_ttl: Gauge,
    source: Arc<SnapshotSource>,
    snapshot: Arc<ScrapeSnapshot>,
    // Concurrent scrapes would interleave resets and fills.
    scrape_lock: Mutex<()>,
}

impl Exporter {
    /// Collectors reading one pinned snapshot of `source` per scrape.
    pub fn new(source: Arc<SnapshotSource>) -> Result<Self, prometheus::Error> {
        let snapshot = Arc::new(ScrapeSnapshot::new(Arc::clone(&source)));
        Self::assemble(
            source,
            Arc::clone(&snapshot),
            Arc::clone(&snapshot) as Arc<dyn ClientView>,
            Arc::clone(&snapshot) as Arc<dyn AccessPointView>,
            snapshot as Arc<dyn WlanView>,
        )
    }

    /// Collectors over caller-supplied views. The snapshot is still pinned
    /// per scrape, but only views reading `source` see it.
    pub fn with_views(
        source: Arc<SnapshotSource>,
        clients: Arc<dyn ClientView>,
        access_points: Arc<dyn AccessPointView>,
        wlans: Arc<dyn WlanView>,
    ) -> Result<Self, prometheus::Error> {
        let snapshot = Arc::new(ScrapeSnapshot::new(Arc::clone(&source)));
        Self::assemble(source, snapshot, clients, access_points, wlans)
    }

    fn assemble(
        source: Arc<SnapshotSource>,
        snapshot: Arc<ScrapeSnapshot>,
        clients: Arc<dyn ClientView>,
        access_points: Arc<dyn AccessPointView>,
        wlans: Arc<dyn WlanView>,
    ) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let collector_up = gauge_vec(
            &registry,
            "unipoll_collector_up",
            "Whether the collector's last scrape succeeded (1) or failed (0)",
            &["collector"],
        )?;
        let cache_age = Gauge::new(
            "unipoll_cache_age_seconds",
            "Age of the cached controller snapshot, NaN when none was fetched yet",
        )?;
        registry.register(Box::new(cache_age.clone()))?;
        let cache_ttl = Gauge::new(
            "unipoll_cache_ttl_seconds",
            "Current time-to-live of the controller snapshot",
        )?;
        registry.register(Box::new(cache_ttl.clone()))?;

        Ok(Self {
            clients: ClientCollector::new(clients, &registry)?,
            access_points: AccessPointCollector::new(access_points, &registry)?,
            wlans: WlanCollector::new(wlans, &registry)?,
            registry,
            collector_up,
            cache_age,
            cache_ttl,
            source,
            snapshot,
            scrape_lock: Mutex::new(()),
        })
    }

    /// Run every collector and render the registry in text format.
    ///
    /// A failing collector reports `unipoll_collector_up 0` and loses its
    /// series; the others are unaffected. If no snapshot can be read at
    /// all, every collector is down with the same error.
    pub async fn scrape(&self, cancel: &CancellationToken) -> Result<String, prometheus::Error> {
        let _guard = self.scrape_lock.lock().await;

        let (clients, access_points, wlans) = match self.snapshot.pin(cancel).await {
            Ok(_pin) => {
                tokio::join!(
                    self.clients.collect(cancel),
                    self.access_points.collect(cancel),
                    self.wlans.collect(cancel),
                )
            }
            Err(e) => (Err(e.clone()), Err(e.clone()), Err(e)),
        };

        let outcomes: [(&dyn ViewCollector, Result<(), CoreError>); 3] = [
            (&self.clients, clients),
            (&self.access_points, access_points),
            (&self.wlans, wlans),
        ];
        for (collector, outcome) in outcomes {
            let up = match outcome {
                Ok(()) => 1.0,
                Err(e) => {
                    if e.is_cancellation() {
                        debug!(collector = collector.name(), error = %e, "collector interrupted");
                    } else {
                        warn!(collector = collector.name(), error = %e, "collector failed");
                    }
                    collector.clear();
                    0.0
                }
            };
            self.collector_up
                .with_label_values(&[collector.name()])
                .set(up);
        }

        self.cache_age.set(
            self.source
                .age()
                .map_or(f64::NAN, |age| age.as_secs_f64()),
        );
        self.cache_ttl.set(self.source.ttl().as_secs_f64());

        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
