// ── WLAN and site health types ──

use serde::Serialize;

use super::common::RadioBand;

/// A configured wireless network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Wlan {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub security: Option<String>,
    pub wpa_mode: Option<String>,
    pub is_guest: bool,
    pub hidden: bool,
    pub vlan: Option<u16>,
    pub bands: Vec<RadioBand>,
}

/// Health of one site subsystem (`wlan`, `lan`, `wan`, `www`, `vpn`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubsystemHealth {
    pub subsystem: String,
    pub status: Option<String>,
    pub num_user: Option<u64>,
    pub num_guest: Option<u64>,
    pub num_iot: Option<u64>,
    pub num_ap: Option<u64>,
    pub num_adopted: Option<u64>,
    pub num_disabled: Option<u64>,
    pub num_disconnected: Option<u64>,
    pub num_pending: Option<u64>,
    pub tx_bytes_rate: Option<f64>,
    pub rx_bytes_rate: Option<f64>,
}

impl SubsystemHealth {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}
