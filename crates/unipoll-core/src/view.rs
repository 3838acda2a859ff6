// ── Typed read views ──
//
// Narrow per-domain traits over the shared snapshot. Adapters are thin
// projections: they hold an `Arc<SnapshotSource>` and nothing else, do no
// I/O of their own and take no locks. Consumers depend on the traits, so
// tests can substitute fixed data.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::model::{
    AccessPoint, Bss, Client, ClientClassification, ControllerSnapshot, Radio, RoamEvent,
    SubsystemHealth, Wlan,
};
use crate::source::SnapshotSource;

/// Connected clients and what the controller knows about them.
#[async_trait]
pub trait ClientView: Send + Sync {
    async fn clients(&self, cancel: &CancellationToken) -> Result<Arc<[Client]>, CoreError>;

    async fn classifications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[ClientClassification]>, CoreError>;

    async fn roam_history(&self, cancel: &CancellationToken)
    -> Result<Arc<[RoamEvent]>, CoreError>;
}

/// Access points with their radios and BSSes.
#[async_trait]
pub trait AccessPointView: Send + Sync {
    async fn access_points(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[AccessPoint]>, CoreError>;

    async fn radios(&self, cancel: &CancellationToken) -> Result<Arc<[Radio]>, CoreError>;

    async fn bsses(&self, cancel: &CancellationToken) -> Result<Arc<[Bss]>, CoreError>;
}

/// Configured WLANs and site subsystem health.
#[async_trait]
pub trait WlanView: Send + Sync {
    async fn wlans(&self, cancel: &CancellationToken) -> Result<Arc<[Wlan]>, CoreError>;

    async fn health(&self, cancel: &CancellationToken)
    -> Result<Arc<[SubsystemHealth]>, CoreError>;
}

async fn project<T>(
    source: &SnapshotSource,
    cancel: &CancellationToken,
    field: fn(&ControllerSnapshot) -> &Arc<[T]>,
) -> Result<Arc<[T]>, CoreError> {
    let snapshot = source.get_cached_data(cancel).await?;
    Ok(Arc::clone(field(&snapshot)))
}

// ── Adapters ────────────────────────────────────────────────────────

/// [`ClientView`] over a shared [`SnapshotSource`].
#[derive(Debug, Clone)]
pub struct ClientAdapter {
    source: Arc<SnapshotSource>,
}

impl ClientAdapter {
    pub fn new(source: Arc<SnapshotSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ClientView for ClientAdapter {
    async fn clients(&self, cancel: &CancellationToken) -> Result<Arc<[Client]>, CoreError> {
        project(&self.source, cancel, |s| &s.clients).await
    }

    async fn classifications(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[ClientClassification]>, CoreError> {
        project(&self.source, cancel, |s| &s.classifications).await
    }

    async fn roam_history(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[RoamEvent]>, CoreError> {
        project(&self.source, cancel, |s| &s.roam_history).await
    }
}

/// [`AccessPointView`] over a shared [`SnapshotSource`].
#[derive(Debug, Clone)]
pub struct AccessPointAdapter {
    source: Arc<SnapshotSource>,
}

impl AccessPointAdapter {
    pub fn new(source: Arc<SnapshotSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl AccessPointView for AccessPointAdapter {
    async fn access_points(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[AccessPoint]>, CoreError> {
        project(&self.source, cancel, |s| &s.access_points).await
    }

    async fn radios(&self, cancel: &CancellationToken) -> Result<Arc<[Radio]>, CoreError> {
        project(&self.source, cancel, |s| &s.radios).await
    }

    async fn bsses(&self, cancel: &CancellationToken) -> Result<Arc<[Bss]>, CoreError> {
        project(&self.source, cancel, |s| &s.bsses).await
    }
}

/// [`WlanView`] over a shared [`SnapshotSource`].
#[derive(Debug, Clone)]
pub struct WlanAdapter {
    source: Arc<SnapshotSource>,
}

impl WlanAdapter {
    pub fn new(source: Arc<SnapshotSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl WlanView for WlanAdapter {
    async fn wlans(&self, cancel: &CancellationToken) -> Result<Arc<[Wlan]>, CoreError> {
        project(&self.source, cancel, |s| &s.wlans).await
    }

    async fn health(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Arc<[SubsystemHealth]>, CoreError> {
        project(&self.source, cancel, |s| &s.health).await
    }
}
