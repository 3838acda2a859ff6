// Legacy API WLAN configuration endpoint

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyWlanConf;

impl LegacyClient {
    /// List configured WLANs.
    ///
    /// `GET /api/s/{site}/rest/wlanconf`
    pub async fn list_wlans(&self) -> Result<Vec<LegacyWlanConf>, Error> {
        debug!("listing WLAN configurations");
        self.get("rest/wlanconf").await
    }
}
