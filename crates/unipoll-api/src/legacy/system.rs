// Legacy API system endpoints
//
// Site health dashboard: one entry per subsystem (wlan, lan, wan, www, vpn).

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyHealth;

impl LegacyClient {
    /// Get site health dashboard metrics.
    ///
    /// `GET /api/s/{site}/stat/health`
    pub async fn get_health(&self) -> Result<Vec<LegacyHealth>, Error> {
        debug!("fetching site health");
        self.get("stat/health").await
    }
}
