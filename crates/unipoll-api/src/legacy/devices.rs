// Legacy API device endpoints
//
// Device inventory and live statistics from stat/device. Access points
// carry their radio_table, radio_table_stats and vap_table inline.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyDevice;

impl LegacyClient {
    /// List all devices with full statistics.
    ///
    /// `GET /api/s/{site}/stat/device`
    pub async fn list_devices(&self) -> Result<Vec<LegacyDevice>, Error> {
        debug!("listing devices");
        self.get("stat/device").await
    }
}
