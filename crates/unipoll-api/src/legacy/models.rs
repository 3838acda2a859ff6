// Legacy API response types
//
// Models for the controller's legacy JSON API. All responses are wrapped
// in the `LegacyResponse<T>` envelope. Fields use `#[serde(default)]` liberally
// because the API is inconsistent about field presence across firmware versions.
// Numbers that some firmware sends as strings ("auto", "40") stay `Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard legacy API response envelope.
///
/// Every legacy endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Metadata from the legacy envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

// ── Device ───────────────────────────────────────────────────────────

/// Full device object from `stat/device`.
///
/// The legacy API can return 100+ fields per device. We model what the
/// wireless views need explicitly; everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub adopted: bool,
    /// 0=offline, 1=online, 2=pending, 4=upgrading, 5=provisioning
    #[serde(default)]
    pub state: i32,
    #[serde(default)]
    pub sys_stats: Option<SysStats>,
    #[serde(default, rename = "system-stats")]
    pub system_stats: Option<SystemStats>,
    #[serde(default)]
    pub uptime: Option<i64>,
    #[serde(default)]
    pub num_sta: Option<i32>,
    #[serde(default, rename = "user-num_sta")]
    pub user_num_sta: Option<i32>,
    #[serde(default, rename = "guest-num_sta")]
    pub guest_num_sta: Option<i32>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub satisfaction: Option<i32>,
    #[serde(default)]
    pub radio_table: Vec<LegacyRadio>,
    #[serde(default)]
    pub radio_table_stats: Vec<LegacyRadioStats>,
    #[serde(default)]
    pub vap_table: Vec<LegacyVap>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Memory and load statistics nested inside `LegacyDevice`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SysStats {
    #[serde(default, rename = "loadavg_1")]
    pub load_1: Option<String>,
    #[serde(default)]
    pub mem_total: Option<i64>,
    #[serde(default)]
    pub mem_used: Option<i64>,
}

/// CPU and memory utilization percentages (sent as strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub mem: Option<String>,
}

/// Radio configuration entry from a device's `radio_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyRadio {
    pub name: String,
    #[serde(default)]
    pub radio: Option<String>,
    /// Configured channel: a number or `"auto"`.
    #[serde(default)]
    pub channel: Option<Value>,
    /// Channel width in MHz, a number or numeric string.
    #[serde(default)]
    pub ht: Option<Value>,
    #[serde(default)]
    pub tx_power_mode: Option<String>,
    #[serde(default)]
    pub min_txpower: Option<i32>,
    #[serde(default)]
    pub max_txpower: Option<i32>,
}

/// Live radio statistics from a device's `radio_table_stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyRadioStats {
    pub name: String,
    #[serde(default)]
    pub radio: Option<String>,
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub tx_power: Option<i32>,
    #[serde(default)]
    pub num_sta: Option<i32>,
    /// Total channel utilization, percent.
    #[serde(default)]
    pub cu_total: Option<i32>,
    #[serde(default)]
    pub cu_self_rx: Option<i32>,
    #[serde(default)]
    pub cu_self_tx: Option<i32>,
    #[serde(default)]
    pub tx_packets: Option<i64>,
    #[serde(default)]
    pub tx_retries: Option<i64>,
    #[serde(default)]
    pub satisfaction: Option<i32>,
}

/// Virtual AP (one BSS per radio per WLAN) from a device's `vap_table`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyVap {
    pub bssid: String,
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub radio: Option<String>,
    #[serde(default)]
    pub radio_name: Option<String>,
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub wlanconf_id: Option<String>,
    #[serde(default)]
    pub up: Option<bool>,
    #[serde(default)]
    pub is_guest: Option<bool>,
    #[serde(default)]
    pub num_sta: Option<i32>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub satisfaction: Option<i32>,
}

// ── Client (Station) ─────────────────────────────────────────────────

/// Connected client from `stat/sta`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyClientEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub oui: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_guest: Option<bool>,
    #[serde(default)]
    pub is_wired: Option<bool>,
    #[serde(default)]
    pub signal: Option<i32>,
    #[serde(default)]
    pub rssi: Option<i32>,
    #[serde(default)]
    pub noise: Option<i32>,
    #[serde(default)]
    pub satisfaction: Option<i32>,
    #[serde(default)]
    pub tx_bytes: Option<i64>,
    #[serde(default)]
    pub rx_bytes: Option<i64>,
    #[serde(default)]
    pub tx_rate: Option<i64>,
    #[serde(default)]
    pub rx_rate: Option<i64>,
    #[serde(default)]
    pub uptime: Option<i64>,
    #[serde(default)]
    pub essid: Option<String>,
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub channel: Option<i32>,
    #[serde(default)]
    pub radio: Option<String>,
    #[serde(default)]
    pub radio_proto: Option<String>,
    #[serde(default)]
    pub ap_mac: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Known client from `rest/user`, carrying the controller's fingerprint
/// classification (numeric category/family/vendor/OS identifiers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyKnownClient {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub oui: Option<String>,
    #[serde(default)]
    pub dev_cat: Option<i64>,
    #[serde(default)]
    pub dev_family: Option<i64>,
    #[serde(default)]
    pub dev_vendor: Option<i64>,
    #[serde(default)]
    pub dev_id: Option<i64>,
    #[serde(default)]
    pub os_name: Option<i64>,
    #[serde(default)]
    pub fingerprint_override: Option<bool>,
    #[serde(default)]
    pub dev_id_override: Option<i64>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── WLAN ─────────────────────────────────────────────────────────────

/// WLAN configuration from `rest/wlanconf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyWlanConf {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub security: Option<String>,
    #[serde(default)]
    pub wpa_mode: Option<String>,
    #[serde(default)]
    pub is_guest: Option<bool>,
    #[serde(default)]
    pub hide_ssid: Option<bool>,
    #[serde(default)]
    pub vlan_enabled: Option<bool>,
    /// VLAN id, a number or numeric string depending on firmware.
    #[serde(default)]
    pub vlan: Option<Value>,
    /// Older firmware: `"both"`, `"2g"` or `"5g"`.
    #[serde(default)]
    pub wlan_band: Option<String>,
    /// Newer firmware: list of `"2g"`, `"5g"`, `"6g"`.
    #[serde(default)]
    pub wlan_bands: Option<Vec<String>>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Event ────────────────────────────────────────────────────────────

/// Event object from `stat/event`.
///
/// Roaming events (`EVT_WU_Roam`, `EVT_WU_RoamRadio`) carry the
/// `ap_from`/`ap_to` and channel/radio transition fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyEvent {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub datetime: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub time: Option<i64>,
    #[serde(default)]
    pub subsystem: Option<String>,
    /// Client MAC for wireless-user events.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub ap: Option<String>,
    #[serde(default)]
    pub ap_from: Option<String>,
    #[serde(default)]
    pub ap_to: Option<String>,
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub channel_from: Option<Value>,
    #[serde(default)]
    pub channel_to: Option<Value>,
    #[serde(default)]
    pub radio: Option<String>,
    #[serde(default)]
    pub radio_from: Option<String>,
    #[serde(default)]
    pub radio_to: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl LegacyEvent {
    /// Whether this is a client roaming event (AP-to-AP or radio-to-radio).
    pub fn is_roam(&self) -> bool {
        matches!(
            self.key.as_deref(),
            Some("EVT_WU_Roam" | "EVT_WU_RoamRadio")
        )
    }
}

// ── Health ───────────────────────────────────────────────────────────

/// Subsystem entry from `stat/health` (`wlan`, `lan`, `wan`, `www`, `vpn`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyHealth {
    pub subsystem: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub num_user: Option<i64>,
    #[serde(default)]
    pub num_guest: Option<i64>,
    #[serde(default)]
    pub num_iot: Option<i64>,
    #[serde(default)]
    pub num_ap: Option<i64>,
    #[serde(default)]
    pub num_adopted: Option<i64>,
    #[serde(default)]
    pub num_disabled: Option<i64>,
    #[serde(default)]
    pub num_disconnected: Option<i64>,
    #[serde(default)]
    pub num_pending: Option<i64>,
    /// Transmit rate in bytes/s.
    #[serde(default, rename = "tx_bytes-r")]
    pub tx_bytes_rate: Option<f64>,
    /// Receive rate in bytes/s.
    #[serde(default, rename = "rx_bytes-r")]
    pub rx_bytes_rate: Option<f64>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
