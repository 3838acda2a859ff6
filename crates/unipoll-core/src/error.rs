// ── Core error types ──
//
// User-facing errors from unipoll-core. Consumers never see reqwest errors
// or JSON parse failures directly: `From<unipoll_api::Error>` translates
// them into domain variants. Everything here is `Clone` because one failed
// refresh is reported to every caller that waited on it.

use thiserror::Error;

use crate::cache::CacheError;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Controller did not answer within {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Controller API errors (wrapped, not exposed raw) ─────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response from controller: {message}")]
    Decode { message: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    // ── Caller-side outcomes ─────────────────────────────────────────
    #[error("Request cancelled")]
    Cancelled,

    #[error("Shutting down")]
    ShuttingDown,

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl CoreError {
    /// `true` for the caller's own cancellation or process shutdown, as
    /// opposed to the controller failing to produce data.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::ShuttingDown)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<unipoll_api::Error> for CoreError {
    fn from(err: unipoll_api::Error) -> Self {
        match err {
            unipoll_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            unipoll_api::Error::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- re-authentication required".into(),
            },
            unipoll_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            unipoll_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            unipoll_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            unipoll_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            unipoll_api::Error::LegacyApi { message, status } => {
                CoreError::Api { message, status }
            }
            unipoll_api::Error::Deserialization { message, body: _ } => {
                CoreError::Decode { message }
            }
            unipoll_api::Error::UnsupportedOperation(op) => CoreError::Unsupported {
                operation: op.to_string(),
            },
        }
    }
}
