//! Binary error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use unipoll_config::ConfigError;
use unipoll_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONFIG: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unipoll::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Reason: {reason}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in the profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(unipoll::auth_failed),
        help(
            "Verify the profile's username and password.\n\
             Passwords are read from password_env, UNIPOLL_PASSWORD, the system keyring \
             (service 'unipoll', entry '<profile>/password'), then the config file."
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(unipoll::no_credentials),
        help(
            "Set username in the profile (or UNIPOLL_USERNAME) and provide a password \
             through password_env, UNIPOLL_PASSWORD or the system keyring."
        )
    )]
    NoCredentials { profile: String },

    // ── Controller ───────────────────────────────────────────────────

    #[error("Controller error: {message}")]
    #[diagnostic(code(unipoll::controller))]
    Controller { message: String },

    #[error("Controller did not answer within {seconds}s")]
    #[diagnostic(
        code(unipoll::timeout),
        help("Increase --refresh-timeout or check controller responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("Interrupted")]
    #[diagnostic(code(unipoll::interrupted))]
    Interrupted,

    // ── Configuration ────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unipoll::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(unipoll::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller profiles configured")]
    #[diagnostic(
        code(unipoll::no_profiles),
        help(
            "Add a [profiles.<name>] table with at least `controller` and `username`.\n\
             Expected config at: {path}"
        )
    )]
    NoProfiles { path: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(unipoll::no_config))]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(unipoll::config))]
    Config(Box<figment::Error>),

    // ── Server ───────────────────────────────────────────────────────

    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(unipoll::bind),
        help("Is another exporter already running? Pick a different --listen address.")
    )]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Metrics registry error: {0}")]
    #[diagnostic(code(unipoll::metrics))]
    Metrics(#[from] prometheus::Error),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not serialize snapshot: {0}")]
    #[diagnostic(code(unipoll::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Bind { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. }
            | Self::NoProfiles { .. }
            | Self::NoConfig { .. }
            | Self::Config(_) => exit_code::CONFIG,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Cancelled | CoreError::ShuttingDown => CliError::Interrupted,
            CoreError::Config { message } => CliError::Validation {
                field: "controller".into(),
                reason: message,
            },
            other @ (CoreError::Api { .. }
            | CoreError::Decode { .. }
            | CoreError::Unsupported { .. }
            | CoreError::Cache(_)) => CliError::Controller {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::NoProfiles => CliError::NoProfiles {
                path: unipoll_config::config_path().display().to_string(),
            },
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::Figment(err) => CliError::Config(err),
        }
    }
}
