// ── Shared snapshot source ──
//
// One `TtlCache` holding the whole `ControllerSnapshot`, filled by one
// injected fetcher. Every view reads through here, so a scrape that touches
// clients, APs and WLANs costs at most one controller round.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::TtlCache;
use crate::error::CoreError;
use crate::model::ControllerSnapshot;

/// Produces a complete snapshot, or fails as a whole.
///
/// Implementations own transport, authentication and any retry policy.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch(&self) -> Result<ControllerSnapshot, CoreError>;
}

/// The shared aggregate behind every view.
pub struct SnapshotSource {
    cache: TtlCache<Arc<ControllerSnapshot>, CoreError>,
    fetcher: Arc<dyn SnapshotFetcher>,
    refresh_timeout: Duration,
    shutdown: CancellationToken,
}

impl SnapshotSource {
    /// `refresh_timeout` bounds each fetch. `shutdown` aborts an in-flight
    /// fetch when the process is stopping.
    pub fn new(
        fetcher: Arc<dyn SnapshotFetcher>,
        ttl: Duration,
        refresh_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cache: TtlCache::new(ttl, "controller-snapshot"),
            fetcher,
            refresh_timeout,
            shutdown,
        }
    }

    /// The current snapshot, refreshed at most once per TTL window no
    /// matter how many callers ask concurrently.
    ///
    /// `cancel` only abandons this caller's wait. A refresh it started
    /// keeps running for everyone else.
    pub async fn get_cached_data(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<ControllerSnapshot>, CoreError> {
        let fetcher = Arc::clone(&self.fetcher);
        let timeout = self.refresh_timeout;
        let shutdown = self.shutdown.clone();

        let refresh = move || async move {
            tokio::select! {
                () = shutdown.cancelled() => Err(CoreError::ShuttingDown),
                result = tokio::time::timeout(timeout, fetcher.fetch()) => match result {
                    Ok(Ok(snapshot)) => Ok(Arc::new(snapshot)),
                    Ok(Err(e)) => Err(e),
                    Err(_) => Err(CoreError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    }),
                },
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!("snapshot read cancelled by caller");
                Err(CoreError::Cancelled)
            }
            result = self.cache.get(refresh) => result,
        }
    }

    /// The snapshot if fresh, without refreshing or waiting.
    pub fn cached(&self) -> Option<Arc<ControllerSnapshot>> {
        self.cache.get_cached()
    }

    pub fn invalidate(&self) {
        self.cache.invalidate();
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.cache.set_ttl(ttl);
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Time since the last successful refresh.
    pub fn age(&self) -> Option<Duration> {
        self.cache.age()
    }
}

impl std::fmt::Debug for SnapshotSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotSource")
            .field("cache", &self.cache)
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}
