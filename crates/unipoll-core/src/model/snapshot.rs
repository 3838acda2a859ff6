// ── Aggregate snapshot ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::access_point::{AccessPoint, Bss, Radio};
use super::client::{Client, ClientClassification, RoamEvent};
use super::wlan::{SubsystemHealth, Wlan};

/// Everything one refresh collects from the controller.
///
/// Built in one piece and never mutated afterwards, so every collection
/// reflects the same moment. Collections are `Arc<[T]>` so views can hand
/// them out without copying.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub clients: Arc<[Client]>,
    pub classifications: Arc<[ClientClassification]>,
    pub roam_history: Arc<[RoamEvent]>,
    pub access_points: Arc<[AccessPoint]>,
    pub radios: Arc<[Radio]>,
    pub bsses: Arc<[Bss]>,
    pub wlans: Arc<[Wlan]>,
    pub health: Arc<[SubsystemHealth]>,
    /// Wall-clock time the fetch completed.
    pub fetched_at: DateTime<Utc>,
}

impl ControllerSnapshot {
    /// A snapshot with every collection empty.
    pub fn empty(fetched_at: DateTime<Utc>) -> Self {
        Self {
            clients: Arc::from([]),
            classifications: Arc::from([]),
            roam_history: Arc::from([]),
            access_points: Arc::from([]),
            radios: Arc::from([]),
            bsses: Arc::from([]),
            wlans: Arc::from([]),
            health: Arc::from([]),
            fetched_at,
        }
    }
}
