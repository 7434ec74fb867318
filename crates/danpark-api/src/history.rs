// Parking-history endpoints.
//
// These routes are mounted at the backend root (no `api/` prefix) and key
// lots by the backend's numeric id, unlike the string ids used everywhere
// else -- callers convert at the boundary.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::ParkingHistory;

impl ApiClient {
    /// List the caller's parking history, most recent first.
    pub async fn parking_histories(&self) -> Result<Vec<ParkingHistory>, Error> {
        let url = self.url("parking-histories");
        Ok(self.get(url).await?.unwrap_or_default())
    }

    /// Record that the caller parked at a lot. The backend stamps the time.
    pub async fn record_parking(&self, lot_id: i64) -> Result<ParkingHistory, Error> {
        let url = self.url("parking-histories");
        let body = serde_json::json!({ "parkingLotId": lot_id });
        self.post(url, &body).await?.ok_or(Error::MissingData)
    }
}
