// ── Client metrics ──

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use prometheus::{GaugeVec, Registry};

use unipoll_core::{CancellationToken, ClientView, CoreError};

use super::{ViewCollector, as_f64, flag, gauge_vec, label};

const CLIENT: &[&str] = &["mac", "name"];
const WIRELESS: &[&str] = &["mac", "name", "essid", "ap_mac", "band"];

pub struct ClientCollector {
    view: Arc<dyn ClientView>,
    info: GaugeVec,
    signal: GaugeVec,
    noise: GaugeVec,
    satisfaction: GaugeVec,
    tx_rate: GaugeVec,
    rx_rate: GaugeVec,
    tx_bytes: GaugeVec,
    rx_bytes: GaugeVec,
    uptime: GaugeVec,
    per_ssid: GaugeVec,
    device: GaugeVec,
    roams: GaugeVec,
}

impl ClientCollector {
    pub fn new(view: Arc<dyn ClientView>, registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            view,
            info: gauge_vec(
                registry,
                "unipoll_client_info",
                "Connected client (always 1)",
                &[
                    "mac", "name", "hostname", "ip", "network", "essid", "ap_mac", "band",
                    "radio_proto", "wired", "guest",
                ],
            )?,
            signal: gauge_vec(
                registry,
                "unipoll_client_signal_dbm",
                "Client signal strength",
                WIRELESS,
            )?,
            noise: gauge_vec(
                registry,
                "unipoll_client_noise_dbm",
                "Noise floor seen by the client's radio",
                WIRELESS,
            )?,
            satisfaction: gauge_vec(
                registry,
                "unipoll_client_satisfaction_percent",
                "Controller-computed client experience score",
                WIRELESS,
            )?,
            tx_rate: gauge_vec(
                registry,
                "unipoll_client_tx_rate_bps",
                "Current PHY transmit rate",
                WIRELESS,
            )?,
            rx_rate: gauge_vec(
                registry,
                "unipoll_client_rx_rate_bps",
                "Current PHY receive rate",
                WIRELESS,
            )?,
            tx_bytes: gauge_vec(
                registry,
                "unipoll_client_transmit_bytes",
                "Bytes sent to the client since association",
                CLIENT,
            )?,
            rx_bytes: gauge_vec(
                registry,
                "unipoll_client_receive_bytes",
                "Bytes received from the client since association",
                CLIENT,
            )?,
            uptime: gauge_vec(
                registry,
                "unipoll_client_uptime_seconds",
                "Time since the client connected",
                CLIENT,
            )?,
            per_ssid: gauge_vec(
                registry,
                "unipoll_wireless_clients",
                "Wireless clients per SSID and band",
                &["essid", "band"],
            )?,
            device: gauge_vec(
                registry,
                "unipoll_client_device_info",
                "Controller fingerprint of a known client (always 1)",
                &["mac", "name", "category", "family", "vendor", "os", "overridden"],
            )?,
            roams: gauge_vec(
                registry,
                "unipoll_client_roams",
                "Roams per client within the configured history window",
                &["mac", "kind"],
            )?,
        })
    }

    fn all(&self) -> [&GaugeVec; 12] {
        [
            &self.info,
            &self.signal,
            &self.noise,
            &self.satisfaction,
            &self.tx_rate,
            &self.rx_rate,
            &self.tx_bytes,
            &self.rx_bytes,
            &self.uptime,
            &self.per_ssid,
            &self.device,
            &self.roams,
        ]
    }
}

fn id(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[async_trait]
impl ViewCollector for ClientCollector {
    fn name(&self) -> &'static str {
        "clients"
    }

    async fn collect(&self, cancel: &CancellationToken) -> Result<(), CoreError> {
        let (clients, classifications, roams) = tokio::try_join!(
            self.view.clients(cancel),
            self.view.classifications(cancel),
            self.view.roam_history(cancel),
        )?;

        self.clear();

        let mut per_ssid: BTreeMap<(&str, &str), u64> = BTreeMap::new();

        for c in clients.iter() {
            let mac = c.mac.as_str();
            let name = c.display_name();
            let ip = c.ip.map(|ip| ip.to_string()).unwrap_or_default();
            let ap_mac = c.ap_mac.as_ref().map_or("", |m| m.as_str());
            let band = c.band.map_or("", |b| b.as_label());
            let essid = label(c.essid.as_ref());

            self.info
                .with_label_values(&[
                    mac,
                    name,
                    label(c.hostname.as_ref()),
                    ip.as_str(),
                    label(c.network.as_ref()),
                    essid,
                    ap_mac,
                    band,
                    label(c.radio_proto.as_ref()),
                    flag(c.is_wired),
                    flag(c.is_guest),
                ])
                .set(1.0);

            let client = [mac, name];
            if let Some(v) = c.tx_bytes {
                self.tx_bytes.with_label_values(&client).set(as_f64(v));
            }
            if let Some(v) = c.rx_bytes {
                self.rx_bytes.with_label_values(&client).set(as_f64(v));
            }
            if let Some(v) = c.uptime_secs {
                self.uptime.with_label_values(&client).set(as_f64(v));
            }

            if !c.is_wireless() {
                continue;
            }
            *per_ssid.entry((essid, band)).or_default() += 1;

            let wireless = [mac, name, essid, ap_mac, band];
            if let Some(v) = c.signal_dbm {
                self.signal.with_label_values(&wireless).set(f64::from(v));
            }
            if let Some(v) = c.noise_dbm {
                self.noise.with_label_values(&wireless).set(f64::from(v));
            }
            if let Some(v) = c.satisfaction {
                self.satisfaction
                    .with_label_values(&wireless)
                    .set(f64::from(v));
            }
            if let Some(v) = c.tx_rate_kbps {
                self.tx_rate
                    .with_label_values(&wireless)
                    .set(as_f64(v) * 1000.0);
            }
            if let Some(v) = c.rx_rate_kbps {
                self.rx_rate
                    .with_label_values(&wireless)
                    .set(as_f64(v) * 1000.0);
            }
        }

        for ((essid, band), count) in per_ssid {
            self.per_ssid
                .with_label_values(&[essid, band])
                .set(as_f64(count));
        }

        for k in classifications.iter() {
            self.device
                .with_label_values(&[
                    k.mac.as_str(),
                    label(k.name.as_ref()),
                    id(k.category).as_str(),
                    id(k.family).as_str(),
                    id(k.vendor).as_str(),
                    id(k.os).as_str(),
                    flag(k.overridden),
                ])
                .set(1.0);
        }

        for r in roams.iter() {
            let kind: &'static str = r.kind.into();
            self.roams
                .with_label_values(&[r.client_mac.as_str(), kind])
                .inc();
        }

        Ok(())
    }

    fn clear(&self) {
        for vec in self.all() {
            vec.reset();
        }
    }
}
