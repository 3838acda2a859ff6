// Legacy API client (station) endpoints
//
// Connected stations from stat/sta and the known-client table from
// rest/user, which carries the controller's fingerprint classification.

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{LegacyClientEntry, LegacyKnownClient};

impl LegacyClient {
    /// List all currently connected clients (stations).
    ///
    /// `GET /api/s/{site}/stat/sta`
    pub async fn list_clients(&self) -> Result<Vec<LegacyClientEntry>, Error> {
        debug!("listing connected clients");
        self.get("stat/sta").await
    }

    /// List known clients with their device classification.
    ///
    /// `GET /api/s/{site}/rest/user`
    pub async fn list_known_clients(&self) -> Result<Vec<LegacyKnownClient>, Error> {
        debug!("listing known clients");
        self.get("rest/user").await
    }
}
