// ── Identity and radio types shared across the model ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from any common format.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lower = raw.as_ref().trim().to_lowercase().replace('-', ":");
        let is_bare_hex = lower.len() == 12 && lower.chars().all(|c| c.is_ascii_hexdigit());
        if is_bare_hex {
            let pairs: Vec<&str> = (0..12).step_by(2).filter_map(|i| lower.get(i..i + 2)).collect();
            return Self(pairs.join(":"));
        }
        Self(lower)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ── RadioBand ───────────────────────────────────────────────────────

/// Frequency band of a radio, BSS or client association.
///
/// `Display`/`FromStr` use the WLAN config spelling (`2g`, `5g`, `6g`),
/// which doubles as the metric label value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
pub enum RadioBand {
    #[strum(serialize = "2g")]
    #[serde(rename = "2g")]
    Band2G,
    #[strum(serialize = "5g")]
    #[serde(rename = "5g")]
    Band5G,
    #[strum(serialize = "6g")]
    #[serde(rename = "6g")]
    Band6G,
    #[strum(serialize = "unknown")]
    #[serde(rename = "unknown")]
    Unknown,
}

impl RadioBand {
    /// Map a controller radio code (`ng`, `na`, `6e`) to a band.
    pub fn from_radio_code(code: &str) -> Self {
        match code {
            "ng" => Self::Band2G,
            "na" => Self::Band5G,
            "6e" => Self::Band6G,
            _ => Self::Unknown,
        }
    }

    /// Nominal centre frequency in GHz, if known.
    pub fn frequency_ghz(self) -> Option<f64> {
        match self {
            Self::Band2G => Some(2.4),
            Self::Band5G => Some(5.0),
            Self::Band6G => Some(6.0),
            Self::Unknown => None,
        }
    }

    pub fn as_label(self) -> &'static str {
        self.into()
    }
}

// ── DeviceState ─────────────────────────────────────────────────────

/// Device operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Online,
    Offline,
    PendingAdoption,
    Updating,
    Provisioning,
    Unknown,
}

impl DeviceState {
    /// Map the controller's numeric `state` code.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Offline,
            1 => Self::Online,
            2 => Self::PendingAdoption,
            4 => Self::Updating,
            5 => Self::Provisioning,
            _ => Self::Unknown,
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}
