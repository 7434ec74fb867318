// Parking-lot catalog endpoint.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::ParkingLotDto;

impl ApiClient {
    /// Fetch the full parking-lot catalog.
    ///
    /// Called once per session to seed the state store; the stream only
    /// ever updates lots that exist in this catalog.
    pub async fn parking_lots(&self) -> Result<Vec<ParkingLotDto>, Error> {
        let url = self.url("api/parking-lots");
        self.get(url).await?.ok_or(Error::MissingData)
    }
}
