//! Configuration for the unipoll exporter.
//!
//! TOML profiles plus exporter settings, layered with figment (defaults,
//! then file, then `UNIPOLL_`-prefixed environment), credential resolution
//! (env, keyring, plaintext) and translation to
//! `unipoll_core::ControllerConfig`.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use unipoll_api::ControllerPlatform;
use unipoll_core::{ControllerConfig, SnapshotSettings, TlsVerification};

/// Keyring service name for stored passwords.
const KEYRING_SERVICE: &str = "unipoll";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("no controller profiles configured")]
    NoProfiles,

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub exporter: ExporterSettings,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            exporter: ExporterSettings::default(),
            profiles: BTreeMap::new(),
        }
    }
}

/// Exporter-wide settings. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExporterSettings {
    pub listen: SocketAddr,
    /// How long one controller snapshot serves scrapes.
    pub cache_ttl: u64,
    /// Upper bound on one snapshot refresh.
    pub refresh_timeout: u64,
    /// Upper bound on one `/metrics` request.
    pub scrape_timeout: u64,
    pub roam_history_hours: u32,
    pub roam_history_limit: u32,
}

impl Default for ExporterSettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 9897)),
            cache_ttl: 30,
            refresh_timeout: 20,
            scrape_timeout: 25,
            roam_history_hours: 1,
            roam_history_limit: 500,
        }
    }
}

impl ExporterSettings {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout)
    }

    pub fn scrape_timeout(&self) -> Duration {
        Duration::from_secs(self.scrape_timeout)
    }

    pub fn snapshot_settings(&self) -> SnapshotSettings {
        SnapshotSettings {
            roam_history_hours: self.roam_history_hours,
            roam_history_limit: self.roam_history_limit,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("exporter.refresh_timeout", self.refresh_timeout),
            ("exporter.scrape_timeout", self.scrape_timeout),
            ("exporter.roam_history_hours", u64::from(self.roam_history_hours)),
            ("exporter.roam_history_limit", u64::from(self.roam_history_limit)),
        ];
        match fields.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(ConfigError::Validation {
                field: (*field).into(),
                reason: "must be greater than zero".into(),
            }),
            None => Ok(()),
        }
    }
}

/// A named controller profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1").
    pub controller: String,

    #[serde(default = "default_site")]
    pub site: String,

    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept self-signed certificates.
    pub insecure: Option<bool>,

    /// Per-request timeout, seconds.
    pub timeout: Option<u64>,

    /// `"unifi-os"`, `"classic"` or `"auto"` (default: detect).
    pub platform: Option<String>,
}

fn default_site() -> String {
    "default".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unipoll", "unipoll").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("unipoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from defaults, file and environment.
///
/// An explicit `path` must exist. The default path may be absent, in
/// which case only defaults and environment apply.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match path {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound {
                path: p.to_path_buf(),
            });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading config");

    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("UNIPOLL_").split("__"))
        .extract()?;

    config.exporter.validate()?;
    Ok(config)
}

impl Config {
    /// Pick a profile: the requested one, else `default_profile`, else the
    /// only profile if there is exactly one.
    pub fn profile(&self, requested: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }

        let name = match (requested, self.default_profile.as_deref()) {
            (Some(name), _) => name,
            (None, Some(name)) if self.profiles.contains_key(name) => name,
            (None, _) if self.profiles.len() == 1 => {
                return self
                    .profiles
                    .iter()
                    .next()
                    .map(|(n, p)| (n.as_str(), p))
                    .ok_or(ConfigError::NoProfiles);
            }
            (None, Some(name)) => name,
            (None, None) => {
                return Err(ConfigError::Validation {
                    field: "default_profile".into(),
                    reason: "not set and more than one profile is configured".into(),
                });
            }
        };

        self.profiles
            .get_key_value(name)
            .map(|(n, p)| (n.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.into(),
                available: self.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Where secrets come from, so resolution can be exercised without
/// touching the real environment or keyring.
pub trait SecretLookup {
    fn env(&self, name: &str) -> Option<String>;
    fn keyring(&self, service: &str, entry: &str) -> Option<String>;
}

/// Process environment and system keyring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSecrets;

impl SecretLookup for SystemSecrets {
    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }

    fn keyring(&self, service: &str, entry: &str) -> Option<String> {
        keyring::Entry::new(service, entry)
            .and_then(|e| e.get_password())
            .ok()
    }
}

/// Resolve username and password for a profile.
///
/// Password order: the profile's `password_env`, `UNIPOLL_PASSWORD`, the
/// keyring entry `<profile>/password`, then plaintext in the config.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
    secrets: &impl SecretLookup,
) -> Result<(String, SecretString), ConfigError> {
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };

    let username = profile
        .username
        .clone()
        .or_else(|| secrets.env("UNIPOLL_USERNAME"))
        .ok_or_else(no_credentials)?;

    let password = profile
        .password_env
        .as_deref()
        .and_then(|var| secrets.env(var))
        .or_else(|| secrets.env("UNIPOLL_PASSWORD"))
        .or_else(|| secrets.keyring(KEYRING_SERVICE, &format!("{profile_name}/password")))
        .or_else(|| profile.password.clone())
        .ok_or_else(no_credentials)?;

    Ok((username, SecretString::from(password)))
}

fn parse_platform(raw: Option<&str>) -> Result<Option<ControllerPlatform>, ConfigError> {
    match raw {
        None | Some("auto") => Ok(None),
        Some("unifi-os") => Ok(Some(ControllerPlatform::UnifiOs)),
        Some("classic") => Ok(Some(ControllerPlatform::ClassicController)),
        Some(other) => Err(ConfigError::Validation {
            field: "platform".into(),
            reason: format!("expected 'unifi-os', 'classic' or 'auto', got '{other}'"),
        }),
    }
}

/// Build a `ControllerConfig` from a profile.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    secrets: &impl SecretLookup,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let (username, password) = resolve_credentials(profile, profile_name, secrets)?;

    let tls = match (profile.insecure, &profile.ca_cert) {
        (Some(true), _) => TlsVerification::DangerAcceptInvalid,
        (_, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
        (Some(false), None) => TlsVerification::SystemDefaults,
        // local controllers are typically self-signed
        (None, None) => TlsVerification::DangerAcceptInvalid,
    };

    Ok(ControllerConfig {
        url,
        site: profile.site.clone(),
        username,
        password,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
        platform: parse_platform(profile.platform.as_deref())?,
    })
}
