// ── Access point, radio and BSS metrics ──

use std::sync::Arc;

use async_trait::async_trait;
use prometheus::{GaugeVec, Registry};

use unipoll_core::{AccessPointView, CancellationToken, CoreError};

use super::{ViewCollector, as_f64, gauge_vec, label};

const AP: &[&str] = &["mac", "name"];
const RADIO: &[&str] = &["ap_mac", "ap_name", "radio", "band"];
const BSS: &[&str] = &["ap_mac", "bssid", "essid", "band", "radio"];

pub struct AccessPointCollector {
    view: Arc<dyn AccessPointView>,
    // access points
    info: GaugeVec,
    up: GaugeVec,
    adopted: GaugeVec,
    uptime: GaugeVec,
    clients: GaugeVec,
    cpu: GaugeVec,
    memory: GaugeVec,
    load1: GaugeVec,
    satisfaction: GaugeVec,
    tx_bytes: GaugeVec,
    rx_bytes: GaugeVec,
    // radios
    channel: GaugeVec,
    width: GaugeVec,
    tx_power: GaugeVec,
    radio_clients: GaugeVec,
    utilization: GaugeVec,
    tx_packets: GaugeVec,
    tx_retries: GaugeVec,
    // BSSes
    bss_up: GaugeVec,
    bss_clients: GaugeVec,
    bss_tx_bytes: GaugeVec,
    bss_rx_bytes: GaugeVec,
}

impl AccessPointCollector {
    pub fn new(
        view: Arc<dyn AccessPointView>,
        registry: &Registry,
    ) -> Result<Self, prometheus::Error> {
        Ok(Self {
            view,
            info: gauge_vec(
                registry,
                "unipoll_ap_info",
                "Access point inventory (always 1)",
                &["mac", "name", "model", "version", "ip", "state"],
            )?,
            up: gauge_vec(registry, "unipoll_ap_up", "Access point is online", AP)?,
            adopted: gauge_vec(
                registry,
                "unipoll_ap_adopted",
                "Access point is adopted by this controller",
                AP,
            )?,
            uptime: gauge_vec(
                registry,
                "unipoll_ap_uptime_seconds",
                "Access point uptime",
                AP,
            )?,
            clients: gauge_vec(
                registry,
                "unipoll_ap_clients",
                "Associated stations by kind",
                &["mac", "name", "kind"],
            )?,
            cpu: gauge_vec(registry, "unipoll_ap_cpu_percent", "CPU usage", AP)?,
            memory: gauge_vec(registry, "unipoll_ap_memory_percent", "Memory usage", AP)?,
            load1: gauge_vec(registry, "unipoll_ap_load1", "One-minute load average", AP)?,
            satisfaction: gauge_vec(
                registry,
                "unipoll_ap_satisfaction_percent",
                "Average client experience on this access point",
                AP,
            )?,
            tx_bytes: gauge_vec(
                registry,
                "unipoll_ap_transmit_bytes",
                "Bytes transmitted by the access point",
                AP,
            )?,
            rx_bytes: gauge_vec(
                registry,
                "unipoll_ap_receive_bytes",
                "Bytes received by the access point",
                AP,
            )?,
            channel: gauge_vec(
                registry,
                "unipoll_radio_channel",
                "Operating channel",
                RADIO,
            )?,
            width: gauge_vec(
                registry,
                "unipoll_radio_channel_width_mhz",
                "Configured channel width",
                RADIO,
            )?,
            tx_power: gauge_vec(
                registry,
                "unipoll_radio_tx_power_dbm",
                "Current transmit power",
                RADIO,
            )?,
            radio_clients: gauge_vec(
                registry,
                "unipoll_radio_clients",
                "Stations associated to the radio",
                RADIO,
            )?,
            utilization: gauge_vec(
                registry,
                "unipoll_radio_utilization_percent",
                "Channel utilization by source",
                &["ap_mac", "ap_name", "radio", "band", "source"],
            )?,
            tx_packets: gauge_vec(
                registry,
                "unipoll_radio_tx_packets",
                "Packets transmitted by the radio",
                RADIO,
            )?,
            tx_retries: gauge_vec(
                registry,
                "unipoll_radio_tx_retries",
                "Transmit retries on the radio",
                RADIO,
            )?,
            bss_up: gauge_vec(registry, "unipoll_bss_up", "BSS is broadcasting", BSS)?,
            bss_clients: gauge_vec(
                registry,
                "unipoll_bss_clients",
                "Stations associated to the BSS",
                BSS,
            )?,
            bss_tx_bytes: gauge_vec(
                registry,
                "unipoll_bss_transmit_bytes",
                "Bytes transmitted on the BSS",
                BSS,
            )?,
            bss_rx_bytes: gauge_vec(
                registry,
                "unipoll_bss_receive_bytes",
                "Bytes received on the BSS",
                BSS,
            )?,
        })
    }

    fn all(&self) -> [&GaugeVec; 22] {
        [
            &self.info,
            &self.up,
            &self.adopted,
            &self.uptime,
            &self.clients,
            &self.cpu,
            &self.memory,
            &self.load1,
            &self.satisfaction,
            &self.tx_bytes,
            &self.rx_bytes,
            &self.channel,
            &self.width,
            &self.tx_power,
            &self.radio_clients,
            &self.utilization,
            &self.tx_packets,
            &self.tx_retries,
            &self.bss_up,
            &self.bss_clients,
            &self.bss_tx_bytes,
            &self.bss_rx_bytes,
        ]
    }
}

fn bool_gauge(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

#[async_trait]
impl ViewCollector for AccessPointCollector {
    fn name(&self) -> &'static str {
        "access_points"
    }

    async fn collect(&self, cancel: &CancellationToken) -> Result<(), CoreError> {
        let (access_points, radios, bsses) = tokio::try_join!(
            self.view.access_points(cancel),
            self.view.radios(cancel),
            self.view.bsses(cancel),
        )?;

        self.clear();

        for ap in access_points.iter() {
            let mac = ap.mac.as_str();
            let name = ap.display_name();
            let ids = [mac, name];
            let ip = ap.ip.map(|ip| ip.to_string()).unwrap_or_default();
            let state = ap.state.to_string();

            self.info
                .with_label_values(&[
                    mac,
                    name,
                    label(ap.model.as_ref()),
                    label(ap.version.as_ref()),
                    ip.as_str(),
                    state.as_str(),
                ])
                .set(1.0);
            self.up
                .with_label_values(&ids)
                .set(bool_gauge(ap.state.is_online()));
            self.adopted
                .with_label_values(&ids)
                .set(bool_gauge(ap.adopted));

            self.clients
                .with_label_values(&[mac, name, "user"])
                .set(f64::from(ap.user_clients));
            self.clients
                .with_label_values(&[mac, name, "guest"])
                .set(f64::from(ap.guest_clients));

            if let Some(v) = ap.uptime_secs {
                self.uptime.with_label_values(&ids).set(as_f64(v));
            }
            if let Some(v) = ap.cpu_percent {
                self.cpu.with_label_values(&ids).set(v);
            }
            if let Some(v) = ap.mem_percent {
                self.memory.with_label_values(&ids).set(v);
            }
            if let Some(v) = ap.load_1 {
                self.load1.with_label_values(&ids).set(v);
            }
            if let Some(v) = ap.satisfaction {
                self.satisfaction.with_label_values(&ids).set(f64::from(v));
            }
            if let Some(v) = ap.tx_bytes {
                self.tx_bytes.with_label_values(&ids).set(as_f64(v));
            }
            if let Some(v) = ap.rx_bytes {
                self.rx_bytes.with_label_values(&ids).set(as_f64(v));
            }
        }

        for r in radios.iter() {
            let ap_name = r.ap_name.as_deref().unwrap_or_else(|| r.ap_mac.as_str());
            let band = r.band.as_label();
            let ids = [r.ap_mac.as_str(), ap_name, r.name.as_str(), band];

            if let Some(v) = r.channel {
                self.channel.with_label_values(&ids).set(f64::from(v));
            }
            if let Some(v) = r.width_mhz {
                self.width.with_label_values(&ids).set(f64::from(v));
            }
            if let Some(v) = r.tx_power_dbm {
                self.tx_power.with_label_values(&ids).set(f64::from(v));
            }
            if let Some(v) = r.num_clients {
                self.radio_clients.with_label_values(&ids).set(f64::from(v));
            }
            if let Some(v) = r.tx_packets {
                self.tx_packets.with_label_values(&ids).set(as_f64(v));
            }
            if let Some(v) = r.tx_retries {
                self.tx_retries.with_label_values(&ids).set(as_f64(v));
            }

            let utilization = [
                ("total", r.utilization_pct),
                ("self_rx", r.self_rx_pct),
                ("self_tx", r.self_tx_pct),
            ];
            for (source, pct) in utilization {
                if let Some(v) = pct {
                    self.utilization
                        .with_label_values(&[ids[0], ids[1], ids[2], ids[3], source])
                        .set(f64::from(v));
                }
            }
        }

        for b in bsses.iter() {
            let ids = [
                b.ap_mac.as_str(),
                b.bssid.as_str(),
                label(b.essid.as_ref()),
                b.band.as_label(),
                label(b.radio_name.as_ref()),
            ];

            self.bss_up.with_label_values(&ids).set(bool_gauge(b.up));
            self.bss_clients
                .with_label_values(&ids)
                .set(f64::from(b.num_clients));
            if let Some(v) = b.tx_bytes {
                self.bss_tx_bytes.with_label_values(&ids).set(as_f64(v));
            }
            if let Some(v) = b.rx_bytes {
                self.bss_rx_bytes.with_label_values(&ids).set(as_f64(v));
            }
        }

        Ok(())
    }

    fn clear(&self) {
        for vec in self.all() {
            vec.reset();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prometheus::TextEncoder;

    use unipoll_core::AccessPointAdapter;

    use super::*;
    use crate::metrics::testing::{sample_snapshot, source_with};

    async fn render() -> String {
        let registry = Registry::new();
        let collector = AccessPointCollector::new(
            Arc::new(AccessPointAdapter::new(source_with(sample_snapshot()))),
            &registry,
        )
        .unwrap();
        collector.collect(&CancellationToken::new()).await.unwrap();
        TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap()
    }

    #[tokio::test]
    async fn access_point_series() {
        let text = render().await;

        assert!(text.contains(r#"unipoll_ap_up{mac="f0:9f:c2:00:00:01",name="Hallway"} 1"#));
        assert!(text.contains(
            r#"unipoll_ap_clients{kind="user",mac="f0:9f:c2:00:00:01",name="Hallway"} 1"#
        ));
        assert!(text.contains(
            r#"unipoll_ap_cpu_percent{mac="f0:9f:c2:00:00:01",name="Hallway"} 12.5"#
        ));
    }

    #[tokio::test]
    async fn radio_channel_prefers_live_stats() {
        let text = render().await;

        assert!(text.contains(
            r#"unipoll_radio_channel{ap_mac="f0:9f:c2:00:00:01",ap_name="Hallway",band="5g",radio="wifi1"} 44"#
        ));
        assert!(text.contains(
            r#"unipoll_radio_channel{ap_mac="f0:9f:c2:00:00:01",ap_name="Hallway",band="2g",radio="wifi0"} 6"#
        ));
        assert!(text.contains(
            r#"unipoll_radio_utilization_percent{ap_mac="f0:9f:c2:00:00:01",ap_name="Hallway",band="5g",radio="wifi1",source="total"} 31"#
        ));
    }

    #[tokio::test]
    async fn bss_series() {
        let text = render().await;

        assert!(text.contains(
            r#"unipoll_bss_clients{ap_mac="f0:9f:c2:00:00:01",band="5g",bssid="f2:9f:c2:00:00:01",essid="home",radio="wifi1"} 1"#
        ));
    }
}
