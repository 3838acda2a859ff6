//! Shared snapshot cache and typed wireless views for unipoll.
//!
//! - **[`TtlCache`]**: generic single-slot cache with double-checked refresh,
//!   runtime-adjustable TTL and invalidation. At most one refresh runs at a
//!   time; everyone waiting on it sees its outcome.
//!
//! - **[`SnapshotSource`]**: one `TtlCache` holding a whole
//!   [`ControllerSnapshot`], filled by an injected [`SnapshotFetcher`]. The
//!   snapshot is replaced all at once or not at all.
//!
//! - **Views** ([`ClientView`], [`AccessPointView`], [`WlanView`]): narrow
//!   read-only traits, each implemented by an adapter projecting one field
//!   of the shared snapshot.
//!
//! - **[`LegacyFetcher`]**: the production fetcher, collecting every
//!   sub-resource concurrently through `unipoll_api::LegacyClient`.

pub mod cache;
pub mod config;
pub mod convert;
pub mod error;
pub mod fetch;
pub mod model;
pub mod source;
pub mod view;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{CacheError, TtlCache};
pub use config::{ControllerConfig, SnapshotSettings, TlsVerification};
pub use error::CoreError;
pub use fetch::LegacyFetcher;
pub use source::{SnapshotFetcher, SnapshotSource};
pub use view::{
    AccessPointAdapter, AccessPointView, ClientAdapter, ClientView, WlanAdapter, WlanView,
};

pub use model::{
    AccessPoint, Bss, Client, ClientClassification, ControllerSnapshot, DeviceState, MacAddress,
    Radio, RadioBand, RoamEvent, RoamKind, SubsystemHealth, Wlan,
};

// Callers need the same token type the views take.
pub use tokio_util::sync::CancellationToken;
