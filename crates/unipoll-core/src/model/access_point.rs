// ── Access point, radio and BSS types ──
//
// One `stat/device` entry fans out into an `AccessPoint`, one `Radio` per
// radio_table row and one `Bss` per vap_table row. Radios and BSSes carry
// their AP's MAC so consumers can join them back.

use std::net::IpAddr;

use serde::Serialize;

use super::common::{DeviceState, MacAddress, RadioBand};

/// A wireless access point (`type == "uap"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessPoint {
    pub id: String,
    pub mac: MacAddress,
    pub name: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub ip: Option<IpAddr>,
    pub state: DeviceState,
    pub adopted: bool,
    pub uptime_secs: Option<u64>,

    pub num_clients: u32,
    pub user_clients: u32,
    pub guest_clients: u32,
    pub tx_bytes: Option<u64>,
    pub rx_bytes: Option<u64>,
    pub satisfaction: Option<u8>,

    pub cpu_percent: Option<f64>,
    pub mem_percent: Option<f64>,
    pub load_1: Option<f64>,
}

impl AccessPoint {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.mac.as_str())
    }
}

/// One radio of an access point, configuration merged with live stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Radio {
    pub ap_mac: MacAddress,
    pub ap_name: Option<String>,
    /// Interface name (`wifi0`, `ra0`, ...).
    pub name: String,
    pub band: RadioBand,
    /// Operating channel; falls back to the configured one.
    pub channel: Option<u32>,
    pub width_mhz: Option<u32>,
    pub tx_power_dbm: Option<i32>,
    pub tx_power_mode: Option<String>,
    pub num_clients: Option<u32>,
    /// Total channel utilization, percent.
    pub utilization_pct: Option<u8>,
    pub self_rx_pct: Option<u8>,
    pub self_tx_pct: Option<u8>,
    pub tx_packets: Option<u64>,
    pub tx_retries: Option<u64>,
    pub satisfaction: Option<u8>,
}

/// A basic service set: one WLAN broadcast on one radio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bss {
    pub ap_mac: MacAddress,
    pub bssid: MacAddress,
    pub essid: Option<String>,
    pub band: RadioBand,
    pub radio_name: Option<String>,
    pub channel: Option<u32>,
    pub wlan_id: Option<String>,
    pub up: bool,
    pub is_guest: bool,
    pub num_clients: u32,
    pub tx_bytes: Option<u64>,
    pub rx_bytes: Option<u64>,
    pub satisfaction: Option<u8>,
}
