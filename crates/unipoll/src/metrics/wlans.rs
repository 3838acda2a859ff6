// ── WLAN and site health metrics ──

use std::sync::Arc;

use async_trait::async_trait;
use prometheus::{GaugeVec, Registry};

use unipoll_core::{CancellationToken, CoreError, WlanView};

use super::{ViewCollector, as_f64, flag, gauge_vec, label};

pub struct WlanCollector {
    view: Arc<dyn WlanView>,
    info: GaugeVec,
    enabled: GaugeVec,
    subsystem_up: GaugeVec,
    users: GaugeVec,
    devices: GaugeVec,
    throughput: GaugeVec,
}

impl WlanCollector {
    pub fn new(view: Arc<dyn WlanView>, registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            view,
            info: gauge_vec(
                registry,
                "unipoll_wlan_info",
                "Configured WLAN (always 1)",
                &["id", "name", "security", "wpa_mode", "vlan", "bands", "guest", "hidden"],
            )?,
            enabled: gauge_vec(
                registry,
                "unipoll_wlan_enabled",
                "WLAN is enabled",
                &["id", "name"],
            )?,
            subsystem_up: gauge_vec(
                registry,
                "unipoll_subsystem_up",
                "Site subsystem reports status ok",
                &["subsystem", "status"],
            )?,
            users: gauge_vec(
                registry,
                "unipoll_subsystem_users",
                "Connected users by kind",
                &["subsystem", "kind"],
            )?,
            devices: gauge_vec(
                registry,
                "unipoll_subsystem_devices",
                "Subsystem devices by state",
                &["subsystem", "state"],
            )?,
            throughput: gauge_vec(
                registry,
                "unipoll_subsystem_throughput_bytes_per_second",
                "Subsystem throughput by direction",
                &["subsystem", "direction"],
            )?,
        })
    }
}

#[async_trait]
impl ViewCollector for WlanCollector {
    fn name(&self) -> &'static str {
        "wlans"
    }

    async fn collect(&self, cancel: &CancellationToken) -> Result<(), CoreError> {
        let (wlans, health) =
            tokio::try_join!(self.view.wlans(cancel), self.view.health(cancel))?;

        self.clear();

        for w in wlans.iter() {
            let vlan = w.vlan.map(|v| v.to_string()).unwrap_or_default();
            let bands = w
                .bands
                .iter()
                .map(|b| b.as_label())
                .collect::<Vec<_>>()
                .join(",");

            self.info
                .with_label_values(&[
                    w.id.as_str(),
                    w.name.as_str(),
                    label(w.security.as_ref()),
                    label(w.wpa_mode.as_ref()),
                    vlan.as_str(),
                    bands.as_str(),
                    flag(w.is_guest),
                    flag(w.hidden),
                ])
                .set(1.0);
            self.enabled
                .with_label_values(&[w.id.as_str(), w.name.as_str()])
                .set(if w.enabled { 1.0 } else { 0.0 });
        }

        for h in health.iter() {
            let subsystem = h.subsystem.as_str();

            self.subsystem_up
                .with_label_values(&[subsystem, label(h.status.as_ref())])
                .set(if h.is_ok() { 1.0 } else { 0.0 });

            let counts = [
                (&self.users, "user", h.num_user),
                (&self.users, "guest", h.num_guest),
                (&self.users, "iot", h.num_iot),
                (&self.devices, "total", h.num_ap),
                (&self.devices, "adopted", h.num_adopted),
                (&self.devices, "disabled", h.num_disabled),
                (&self.devices, "disconnected", h.num_disconnected),
                (&self.devices, "pending", h.num_pending),
            ];
            for (vec, kind, value) in counts {
                if let Some(v) = value {
                    vec.with_label_values(&[subsystem, kind]).set(as_f64(v));
                }
            }

            for (direction, rate) in [("tx", h.tx_bytes_rate), ("rx", h.rx_bytes_rate)] {
                if let Some(v) = rate {
                    self.throughput
                        .with_label_values(&[subsystem, direction])
                        .set(v);
                }
            }
        }

        Ok(())
    }

    fn clear(&self) {
        for vec in [
            &self.info,
            &self.enabled,
            &self.subsystem_up,
            &self.users,
            &self.devices,
            &self.throughput,
        ] {
            vec.reset();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prometheus::TextEncoder;

    use unipoll_core::WlanAdapter;

    use super::*;
    use crate::metrics::testing::{sample_snapshot, source_with};

    #[tokio::test]
    async fn wlan_and_health_series() {
        let registry = Registry::new();
        let collector = WlanCollector::new(
            Arc::new(WlanAdapter::new(source_with(sample_snapshot()))),
            &registry,
        )
        .unwrap();
        collector.collect(&CancellationToken::new()).await.unwrap();

        let text = TextEncoder::new()
            .encode_to_string(&registry.gather())
            .unwrap();

        assert!(text.contains(
            r#"unipoll_wlan_info{bands="2g,5g",guest="false",hidden="false",id="w1",name="home",security="wpapsk",vlan="",wpa_mode="wpa2"} 1"#
        ));
        assert!(text.contains(r#"unipoll_wlan_enabled{id="w1",name="home"} 1"#));
        assert!(text.contains(r#"unipoll_subsystem_up{status="ok",subsystem="wlan"} 1"#));
        assert!(text.contains(r#"unipoll_subsystem_devices{state="total",subsystem="wlan"} 1"#));
        assert!(text.contains(
            r#"unipoll_subsystem_throughput_bytes_per_second{direction="tx",subsystem="wlan"} 1200.5"#
        ));
    }
}
