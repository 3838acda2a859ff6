// Legacy API event endpoints
//
// Recent events from stat/event. The POST form accepts a time window
// (`within`, hours) and a result limit, newest first.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::LegacyEvent;

impl LegacyClient {
    /// List events from the last `within_hours` hours, newest first.
    ///
    /// `POST /api/s/{site}/stat/event` with `{"within", "_limit", "_sort"}`
    pub async fn list_events(
        &self,
        within_hours: u32,
        limit: u32,
    ) -> Result<Vec<LegacyEvent>, Error> {
        debug!(within_hours, limit, "listing events");
        self.post(
            "stat/event",
            &json!({
                "within": within_hours,
                "_limit": limit,
                "_sort": "-time",
            }),
        )
        .await
    }

    /// List client roaming events from the last `within_hours` hours.
    ///
    /// Same request as [`list_events`](Self::list_events), filtered to
    /// `EVT_WU_Roam` and `EVT_WU_RoamRadio`.
    pub async fn list_roam_events(
        &self,
        within_hours: u32,
        limit: u32,
    ) -> Result<Vec<LegacyEvent>, Error> {
        let events = self.list_events(within_hours, limit).await?;
        Ok(events.into_iter().filter(LegacyEvent::is_roam).collect())
    }
}
