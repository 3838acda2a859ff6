// ── API-to-domain type conversions ──
//
// Bridges raw `unipoll_api` legacy payloads into `unipoll_core::model`
// records. One-to-one mappings are `From` impls; device fan-out (AP, radios,
// BSSes) and roam filtering are free functions. Numeric fields the
// controller sometimes sends as strings are parsed leniently.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use unipoll_api::legacy::models::{
    LegacyClientEntry, LegacyDevice, LegacyEvent, LegacyHealth, LegacyKnownClient, LegacyRadio,
    LegacyRadioStats, LegacyVap, LegacyWlanConf,
};

use crate::model::{
    AccessPoint, Bss, Client, ClientClassification, ControllerSnapshot, DeviceState, MacAddress,
    Radio, RadioBand, RoamEvent, RoamKind, SubsystemHealth, Wlan,
};

// ── Helpers ────────────────────────────────────────────────────────

fn parse_ip(raw: Option<&String>) -> Option<IpAddr> {
    raw.and_then(|s| s.parse().ok())
}

fn to_u64(raw: Option<i64>) -> Option<u64> {
    raw.and_then(|v| u64::try_from(v).ok())
}

fn to_u32(raw: Option<i32>) -> Option<u32> {
    raw.and_then(|v| u32::try_from(v).ok())
}

fn to_pct(raw: Option<i32>) -> Option<u8> {
    raw.and_then(|v| u8::try_from(v).ok())
}

/// A number, or a string holding one. `"auto"` and friends become `None`.
fn value_to_u32(raw: Option<&Value>) -> Option<u32> {
    match raw? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_f64(raw: Option<&String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn mac(raw: Option<&String>) -> Option<MacAddress> {
    raw.filter(|s| !s.is_empty()).map(MacAddress::new)
}

fn band(raw: Option<&String>) -> Option<RadioBand> {
    raw.map(|code| RadioBand::from_radio_code(code))
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn percent(used: i64, total: i64) -> Option<f64> {
    (total > 0).then(|| used as f64 / total as f64 * 100.0)
}

fn epoch_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

fn parse_datetime(raw: Option<&String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Clients ────────────────────────────────────────────────────────

impl From<LegacyClientEntry> for Client {
    fn from(c: LegacyClientEntry) -> Self {
        let is_wired = c.is_wired.unwrap_or(false);
        // Older firmware reports RSSI above the noise floor instead of dBm.
        let signal_dbm = c.signal.or_else(|| c.rssi.zip(c.noise).map(|(r, n)| n + r));

        Self {
            mac: MacAddress::new(&c.mac),
            ip: parse_ip(c.ip.as_ref()),
            oui: c.oui,
            is_wired,
            is_guest: c.is_guest.unwrap_or(false),
            network: c.network,
            bssid: mac(c.bssid.as_ref()),
            ap_mac: mac(c.ap_mac.as_ref()),
            band: band(c.radio.as_ref()),
            channel: to_u32(c.channel),
            radio_proto: c.radio_proto,
            signal_dbm,
            noise_dbm: c.noise,
            satisfaction: to_pct(c.satisfaction),
            tx_rate_kbps: to_u64(c.tx_rate),
            rx_rate_kbps: to_u64(c.rx_rate),
            tx_bytes: to_u64(c.tx_bytes),
            rx_bytes: to_u64(c.rx_bytes),
            uptime_secs: to_u64(c.uptime),
            essid: c.essid,
            name: c.name,
            hostname: c.hostname,
        }
    }
}

impl From<LegacyKnownClient> for ClientClassification {
    fn from(k: LegacyKnownClient) -> Self {
        let overridden = k.fingerprint_override.unwrap_or(false) || k.dev_id_override.is_some();
        Self {
            mac: MacAddress::new(&k.mac),
            name: k.name,
            oui: k.oui,
            category: k.dev_cat,
            family: k.dev_family,
            vendor: k.dev_vendor,
            device_id: k.dev_id_override.or(k.dev_id),
            os: k.os_name,
            overridden,
        }
    }
}

/// Convert a legacy event into a roam record.
///
/// Returns `None` for anything but `EVT_WU_Roam` / `EVT_WU_RoamRadio`, and
/// for roam events that do not name the client.
pub fn roam_event(e: LegacyEvent) -> Option<RoamEvent> {
    let kind = match e.key.as_deref() {
        Some("EVT_WU_Roam") => RoamKind::ApToAp,
        Some("EVT_WU_RoamRadio") => RoamKind::RadioToRadio,
        _ => return None,
    };
    let client_mac = mac(e.user.as_ref())?;

    let (from_ap, to_ap) = match kind {
        RoamKind::ApToAp => (mac(e.ap_from.as_ref()), mac(e.ap_to.as_ref())),
        RoamKind::RadioToRadio => {
            let ap = mac(e.ap.as_ref());
            (ap.clone(), ap)
        }
    };

    Some(RoamEvent {
        client_mac,
        kind,
        hostname: e.hostname,
        ssid: e.ssid,
        from_ap,
        to_ap,
        from_channel: value_to_u32(e.channel_from.as_ref()),
        to_channel: value_to_u32(e.channel_to.as_ref()).or_else(|| value_to_u32(e.channel.as_ref())),
        from_band: band(e.radio_from.as_ref()),
        to_band: band(e.radio_to.as_ref()).or_else(|| band(e.radio.as_ref())),
        at: epoch_millis(e.time).or_else(|| parse_datetime(e.datetime.as_ref())),
    })
}

// ── Devices ────────────────────────────────────────────────────────

/// Records derived from the `stat/device` list.
#[derive(Debug, Default)]
pub struct WirelessInventory {
    pub access_points: Vec<AccessPoint>,
    pub radios: Vec<Radio>,
    pub bsses: Vec<Bss>,
}

/// Split the device list into access points, radios and BSSes.
///
/// Only `uap` devices contribute; switches and gateways are skipped.
pub fn wireless_inventory(devices: Vec<LegacyDevice>) -> WirelessInventory {
    let mut inventory = WirelessInventory::default();

    for device in devices.into_iter().filter(|d| d.device_type == "uap") {
        let ap_mac = MacAddress::new(&device.mac);

        for config in &device.radio_table {
            let stats = device
                .radio_table_stats
                .iter()
                .find(|s| s.name == config.name);
            inventory
                .radios
                .push(radio(&ap_mac, device.name.as_ref(), config, stats));
        }

        inventory.bsses.extend(
            device
                .vap_table
                .iter()
                .filter_map(|vap| bss(&ap_mac, vap)),
        );

        inventory.access_points.push(access_point(ap_mac, device));
    }

    inventory
}

fn access_point(mac: MacAddress, d: LegacyDevice) -> AccessPoint {
    let cpu_percent = d.system_stats.as_ref().and_then(|s| parse_f64(s.cpu.as_ref()));
    let mem_percent = d
        .system_stats
        .as_ref()
        .and_then(|s| parse_f64(s.mem.as_ref()))
        .or_else(|| {
            let sys = d.sys_stats.as_ref()?;
            percent(sys.mem_used?, sys.mem_total?)
        });
    let load_1 = d.sys_stats.as_ref().and_then(|s| parse_f64(s.load_1.as_ref()));

    AccessPoint {
        id: d.id,
        mac,
        ip: parse_ip(d.ip.as_ref()),
        state: DeviceState::from_code(d.state),
        adopted: d.adopted,
        uptime_secs: to_u64(d.uptime),
        num_clients: to_u32(d.num_sta).unwrap_or(0),
        user_clients: to_u32(d.user_num_sta).unwrap_or(0),
        guest_clients: to_u32(d.guest_num_sta).unwrap_or(0),
        tx_bytes: to_u64(d.tx_bytes),
        rx_bytes: to_u64(d.rx_bytes),
        satisfaction: to_pct(d.satisfaction),
        cpu_percent,
        mem_percent,
        load_1,
        name: d.name,
        model: d.model,
        version: d.version,
    }
}

fn radio(
    ap_mac: &MacAddress,
    ap_name: Option<&String>,
    config: &LegacyRadio,
    stats: Option<&LegacyRadioStats>,
) -> Radio {
    let code = config
        .radio
        .as_ref()
        .or_else(|| stats.and_then(|s| s.radio.as_ref()));

    Radio {
        ap_mac: ap_mac.clone(),
        ap_name: ap_name.cloned(),
        name: config.name.clone(),
        band: code.map_or(RadioBand::Unknown, |c| RadioBand::from_radio_code(c)),
        channel: stats
            .and_then(|s| value_to_u32(s.channel.as_ref()))
            .or_else(|| value_to_u32(config.channel.as_ref())),
        width_mhz: value_to_u32(config.ht.as_ref()),
        tx_power_dbm: stats.and_then(|s| s.tx_power),
        tx_power_mode: config.tx_power_mode.clone(),
        num_clients: stats.and_then(|s| to_u32(s.num_sta)),
        utilization_pct: stats.and_then(|s| to_pct(s.cu_total)),
        self_rx_pct: stats.and_then(|s| to_pct(s.cu_self_rx)),
        self_tx_pct: stats.and_then(|s| to_pct(s.cu_self_tx)),
        tx_packets: stats.and_then(|s| to_u64(s.tx_packets)),
        tx_retries: stats.and_then(|s| to_u64(s.tx_retries)),
        satisfaction: stats.and_then(|s| to_pct(s.satisfaction)),
    }
}

fn bss(ap_mac: &MacAddress, vap: &LegacyVap) -> Option<Bss> {
    let bssid = mac(Some(&vap.bssid))?;
    Some(Bss {
        ap_mac: ap_mac.clone(),
        bssid,
        essid: vap.essid.clone(),
        band: band(vap.radio.as_ref()).unwrap_or(RadioBand::Unknown),
        radio_name: vap.radio_name.clone(),
        channel: value_to_u32(vap.channel.as_ref()),
        wlan_id: vap.wlanconf_id.clone(),
        up: vap.up.unwrap_or(false),
        is_guest: vap.is_guest.unwrap_or(false),
        num_clients: to_u32(vap.num_sta).unwrap_or(0),
        tx_bytes: to_u64(vap.tx_bytes),
        rx_bytes: to_u64(vap.rx_bytes),
        satisfaction: to_pct(vap.satisfaction),
    })
}

// ── WLANs & health ─────────────────────────────────────────────────

fn wlan_bands(w: &LegacyWlanConf) -> Vec<RadioBand> {
    if let Some(bands) = &w.wlan_bands {
        return bands.iter().filter_map(|b| b.parse().ok()).collect();
    }
    match w.wlan_band.as_deref() {
        Some("both") => vec![RadioBand::Band2G, RadioBand::Band5G],
        Some(single) => single.parse().map(|b| vec![b]).unwrap_or_default(),
        None => Vec::new(),
    }
}

impl From<LegacyWlanConf> for Wlan {
    fn from(w: LegacyWlanConf) -> Self {
        let bands = wlan_bands(&w);
        let vlan = if w.vlan_enabled == Some(false) {
            None
        } else {
            value_to_u32(w.vlan.as_ref()).and_then(|v| u16::try_from(v).ok())
        };

        Self {
            id: w.id,
            name: w.name,
            enabled: w.enabled.unwrap_or(true),
            security: w.security,
            wpa_mode: w.wpa_mode,
            is_guest: w.is_guest.unwrap_or(false),
            hidden: w.hide_ssid.unwrap_or(false),
            vlan,
            bands,
        }
    }
}

impl From<LegacyHealth> for SubsystemHealth {
    fn from(h: LegacyHealth) -> Self {
        Self {
            subsystem: h.subsystem,
            status: h.status,
            num_user: to_u64(h.num_user),
            num_guest: to_u64(h.num_guest),
            num_iot: to_u64(h.num_iot),
            num_ap: to_u64(h.num_ap),
            num_adopted: to_u64(h.num_adopted),
            num_disabled: to_u64(h.num_disabled),
            num_disconnected: to_u64(h.num_disconnected),
            num_pending: to_u64(h.num_pending),
            tx_bytes_rate: h.tx_bytes_rate,
            rx_bytes_rate: h.rx_bytes_rate,
        }
    }
}

// ── Snapshot assembly ──────────────────────────────────────────────

/// Raw payloads of one collection round, as returned by the legacy API.
#[derive(Debug, Default)]
pub struct LegacyPayloads {
    pub clients: Vec<LegacyClientEntry>,
    pub known_clients: Vec<LegacyKnownClient>,
    pub devices: Vec<LegacyDevice>,
    pub wlans: Vec<LegacyWlanConf>,
    pub health: Vec<LegacyHealth>,
    pub events: Vec<LegacyEvent>,
}

impl LegacyPayloads {
    /// Convert every payload and assemble the snapshot.
    pub fn into_snapshot(self, fetched_at: DateTime<Utc>) -> ControllerSnapshot {
        let inventory = wireless_inventory(self.devices);
        ControllerSnapshot {
            clients: self.clients.into_iter().map(Client::from).collect(),
            classifications: self
                .known_clients
                .into_iter()
                .map(ClientClassification::from)
                .collect(),
            roam_history: self.events.into_iter().filter_map(roam_event).collect(),
            access_points: inventory.access_points.into(),
            radios: inventory.radios.into(),
            bsses: inventory.bsses.into(),
            wlans: self.wlans.into_iter().map(Wlan::from).collect(),
            health: self.health.into_iter().map(SubsystemHealth::from).collect(),
            fetched_at,
        }
    }
}
