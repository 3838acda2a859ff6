// ── Wireless domain model ──
//
// Canonical, controller-independent records built from legacy API
// payloads. Everything in a `ControllerSnapshot` is one of these.

pub mod access_point;
pub mod client;
pub mod common;
pub mod snapshot;
pub mod wlan;

pub use access_point::{AccessPoint, Bss, Radio};
pub use client::{Client, ClientClassification, RoamEvent, RoamKind};
pub use common::{DeviceState, MacAddress, RadioBand};
pub use snapshot::ControllerSnapshot;
pub use wlan::{SubsystemHealth, Wlan};
