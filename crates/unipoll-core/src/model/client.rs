// ── Client domain types ──

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, IntoStaticStr};

use super::common::{MacAddress, RadioBand};

/// A connected station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Client {
    pub mac: MacAddress,
    pub name: Option<String>,
    pub hostname: Option<String>,
    pub ip: Option<IpAddr>,
    pub oui: Option<String>,
    pub is_wired: bool,
    pub is_guest: bool,
    pub network: Option<String>,

    // Wireless association (empty for wired clients)
    pub essid: Option<String>,
    pub bssid: Option<MacAddress>,
    pub ap_mac: Option<MacAddress>,
    pub band: Option<RadioBand>,
    pub channel: Option<u32>,
    pub radio_proto: Option<String>,
    pub signal_dbm: Option<i32>,
    pub noise_dbm: Option<i32>,
    pub satisfaction: Option<u8>,
    pub tx_rate_kbps: Option<u64>,
    pub rx_rate_kbps: Option<u64>,

    // Traffic
    pub tx_bytes: Option<u64>,
    pub rx_bytes: Option<u64>,
    pub uptime_secs: Option<u64>,
}

impl Client {
    /// Best human-readable label: alias, then hostname, then MAC.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.hostname.as_deref())
            .unwrap_or_else(|| self.mac.as_str())
    }

    pub fn is_wireless(&self) -> bool {
        !self.is_wired
    }
}

/// The controller's fingerprint classification of a known client.
///
/// The identifiers index the controller's fingerprint database; they are
/// passed through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientClassification {
    pub mac: MacAddress,
    pub name: Option<String>,
    pub oui: Option<String>,
    pub category: Option<i64>,
    pub family: Option<i64>,
    pub vendor: Option<i64>,
    pub device_id: Option<i64>,
    pub os: Option<i64>,
    /// An operator overrode the automatic fingerprint.
    pub overridden: bool,
}

/// Kind of client roam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoamKind {
    /// Moved between access points.
    ApToAp,
    /// Moved between radios of the same access point.
    RadioToRadio,
}

/// One entry of a client's roaming history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoamEvent {
    pub client_mac: MacAddress,
    pub kind: RoamKind,
    pub hostname: Option<String>,
    pub ssid: Option<String>,
    pub from_ap: Option<MacAddress>,
    pub to_ap: Option<MacAddress>,
    pub from_channel: Option<u32>,
    pub to_channel: Option<u32>,
    pub from_band: Option<RadioBand>,
    pub to_band: Option<RadioBand>,
    pub at: Option<DateTime<Utc>>,
}
