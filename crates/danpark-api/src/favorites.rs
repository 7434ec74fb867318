// Favorite-lot endpoints.

use crate::client::ApiClient;
use crate::error::Error;

impl ApiClient {
    /// List the ids of the caller's favorite lots.
    pub async fn favorites(&self) -> Result<Vec<String>, Error> {
        let url = self.url("api/favorites");
        // A fresh account has no favorites row; the backend sends data: null.
        Ok(self.get(url).await?.unwrap_or_default())
    }

    /// Mark a lot as a favorite.
    pub async fn add_favorite(&self, lot_id: &str) -> Result<(), Error> {
        let url = self.url("api/favorites");
        let body = serde_json::json!({ "parkingLotId": lot_id });
        let _: Option<serde_json::Value> = self.post(url, &body).await?;
        Ok(())
    }

    /// Remove a lot from favorites.
    pub async fn remove_favorite(&self, lot_id: &str) -> Result<(), Error> {
        let url = self.url(&format!("api/favorites/{lot_id}"));
        let _: Option<serde_json::Value> = self.delete(url).await?;
        Ok(())
    }
}
