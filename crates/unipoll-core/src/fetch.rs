// ── Legacy API snapshot fetcher ──
//
// Collects every sub-resource of a snapshot concurrently through one
// `LegacyClient`. The first failure fails the whole collection. Session
// handling lives here: a fetcher without a session logs in first, and a
// session that expired mid-collection gets exactly one re-login.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use unipoll_api::{ControllerPlatform, Credentials, LegacyClient};

use crate::config::{ControllerConfig, SnapshotSettings};
use crate::convert::LegacyPayloads;
use crate::error::CoreError;
use crate::model::ControllerSnapshot;
use crate::source::SnapshotFetcher;

/// [`SnapshotFetcher`] backed by the controller's legacy API.
pub struct LegacyFetcher {
    client: LegacyClient,
    credentials: Credentials,
    settings: SnapshotSettings,
    authenticated: AtomicBool,
    login_lock: Mutex<()>,
}

impl LegacyFetcher {
    /// Build a fetcher for `config`, detecting the platform if it is not set.
    ///
    /// Does not log in; the first fetch does.
    pub async fn connect(
        config: &ControllerConfig,
        settings: SnapshotSettings,
    ) -> Result<Self, CoreError> {
        let transport = config.transport();
        let platform = match config.platform {
            Some(platform) => platform,
            None => ControllerPlatform::detect(&config.url, &transport).await?,
        };
        debug!(?platform, url = %config.url, site = %config.site, "controller platform");

        let client = LegacyClient::new(config.url.clone(), config.site.clone(), platform, &transport)?;
        Ok(Self::with_client(
            client,
            config.username.clone(),
            config.password.clone(),
            settings,
        ))
    }

    /// Wrap an existing client (tests, custom transports).
    pub fn with_client(
        client: LegacyClient,
        username: String,
        password: SecretString,
        settings: SnapshotSettings,
    ) -> Self {
        Self {
            client,
            credentials: Credentials::new(username, password),
            settings,
            authenticated: AtomicBool::new(false),
            login_lock: Mutex::new(()),
        }
    }

    /// Log in unless a concurrent caller already did while we waited.
    async fn ensure_session(&self, force: bool) -> Result<(), CoreError> {
        let _guard = self.login_lock.lock().await;
        if !force && self.authenticated.load(Ordering::Acquire) {
            return Ok(());
        }
        self.authenticated.store(false, Ordering::Release);
        self.client.login(&self.credentials).await?;
        self.authenticated.store(true, Ordering::Release);
        info!(site = self.client.site(), "logged in to controller");
        Ok(())
    }

    /// End the controller session, if one is open. Failures are logged and
    /// otherwise ignored; the next fetch logs in again either way.
    pub async fn sign_out(&self) {
        let _guard = self.login_lock.lock().await;
        if !self.authenticated.swap(false, Ordering::AcqRel) {
            return;
        }
        match self.client.logout().await {
            Ok(()) => info!(site = self.client.site(), "logged out of controller"),
            Err(e) => warn!(error = %e, "controller logout failed"),
        }
    }

    async fn collect(&self) -> Result<LegacyPayloads, unipoll_api::Error> {
        let hours = self.settings.roam_history_hours;
        let limit = self.settings.roam_history_limit;

        let (clients, known_clients, devices, wlans, health, events) = tokio::try_join!(
            self.client.list_clients(),
            self.client.list_known_clients(),
            self.client.list_devices(),
            self.client.list_wlans(),
            self.client.get_health(),
            self.client.list_roam_events(hours, limit),
        )?;

        Ok(LegacyPayloads {
            clients,
            known_clients,
            devices,
            wlans,
            health,
            events,
        })
    }

    async fn fetch_snapshot(&self) -> Result<ControllerSnapshot, CoreError> {
        if !self.authenticated.load(Ordering::Acquire) {
            self.ensure_session(false).await?;
        }

        let payloads = match self.collect().await {
            Ok(payloads) => payloads,
            Err(e) if e.is_auth_expired() => {
                warn!(error = %e, "controller session expired, logging in again");
                self.ensure_session(true).await?;
                self.collect().await?
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = payloads.into_snapshot(Utc::now());
        debug!(
            clients = snapshot.clients.len(),
            access_points = snapshot.access_points.len(),
            radios = snapshot.radios.len(),
            bsses = snapshot.bsses.len(),
            wlans = snapshot.wlans.len(),
            roams = snapshot.roam_history.len(),
            "snapshot collected"
        );
        Ok(snapshot)
    }
}

#[async_trait]
impl SnapshotFetcher for LegacyFetcher {
    async fn fetch(&self) -> Result<ControllerSnapshot, CoreError> {
        self.fetch_snapshot().await
    }
}
