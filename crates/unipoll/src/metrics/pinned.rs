// ── One snapshot per scrape ──
//
// Every collector reads through its own view, and each view call could land
// on either side of a TTL boundary. `ScrapeSnapshot` fetches once when a
// scrape starts and answers every view call from that snapshot until the
// scrape drops its `PinGuard`, so one `/metrics` response never mixes two
// snapshots.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use unipoll_core::{
    AccessPoint, AccessPointView, Bss, CancellationToken, Client, ClientClassification,
    ClientView, ControllerSnapshot, CoreError, Radio, RoamEvent, SnapshotSource,
    SubsystemHealth, Wlan, WlanView,
};

pub struct ScrapeSnapshot {
    source: Arc<SnapshotSource>,
    pinned: RwLock<Option<Arc<ControllerSnapshot>>>,
}

/// Releases the pinned snapshot when dropped, including when the scrape
/// future itself is dropped mid-way.
pub struct PinGuard<'a> {
    owner: &'a ScrapeSnapshot,
}

impl Drop for PinGuard<'_> {
    fn drop(&mut self) {
        *self
            .owner
            .pinned
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl ScrapeSnapshot {
    pub fn new(source: Arc<SnapshotSource>) -> Self {
        Self {
            source,
            pinned: RwLock::new(None),
        }
    }

    /// Read the shared snapshot once and serve it to every view until the
    /// guard goes away.
    pub async fn pin(&self, cancel: &CancellationToken) -> Result<PinGuard<'_>, CoreError> {
        let snapshot = self.source.get_cached_data(cancel).await?;
        *self.pinned.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
        Ok(PinGuard { owner: self })
    }

    async fn current(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<ControllerSnapshot>, CoreError> {
        let pinned = self
            .pinned
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match pinned {
            Some(snapshot) => Ok(snapshot),
            None => self.source.get_cached_data(cancel).await,
        }
    }
}

#[async_trait]
impl ClientView for ScrapeSnapshot {
    async fn clients(&self, cancel: &CancellationToken) -> Result<Arc<[Client]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.clients))
    }

    async fn classifications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[ClientClassification]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.classifications))
    }

    async fn roam_history(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[RoamEvent]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.roam_history))
    }
}

#[async_trait]
impl AccessPointView for ScrapeSnapshot {
    async fn access_points(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[AccessPoint]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.access_points))
    }

    async fn radios(&self, cancel: &CancellationToken) -> Result<Arc<[Radio]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.radios))
    }

    async fn bsses(&self, cancel: &CancellationToken) -> Result<Arc<[Bss]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.bsses))
    }
}

#[async_trait]
impl WlanView for ScrapeSnapshot {
    async fn wlans(&self, cancel: &CancellationToken) -> Result<Arc<[Wlan]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.wlans))
    }

    async fn health(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[SubsystemHealth]>, CoreError> {
        Ok(Arc::clone(&self.current(cancel).await?.health))
    }
}
