// ── Runtime connection configuration ──
//
// These types describe how to reach a controller and what to collect from
// it. They carry credential data and tuning but never touch disk: the
// binary resolves a profile through `unipoll-config` and hands these in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use unipoll_api::{ControllerPlatform, TlsMode, TransportConfig};
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed certs). Default for local controllers.
    #[default]
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Configuration for polling a single controller site.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller URL (e.g., `https://192.168.1.1`).
    pub url: Url,
    /// Site to poll (usually "default").
    pub site: String,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Skip platform detection when the controller type is known.
    pub platform: Option<ControllerPlatform>,
}

impl ControllerConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
            // LegacyClient::new adds one automatically
            cookie_jar: None,
        }
    }
}

/// What each snapshot collects beyond the fixed endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotSettings {
    /// How far back roaming history reaches, in hours.
    pub roam_history_hours: u32,
    /// Upper bound on events requested per snapshot.
    pub roam_history_limit: u32,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            roam_history_hours: 1,
            roam_history_limit: 500,
        }
    }
}
