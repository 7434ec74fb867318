// User-preference endpoints.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{AppSettings, SettingsUpdate};

impl ApiClient {
    /// Fetch the user's preferences.
    ///
    /// An account that has never saved preferences has no settings row;
    /// the backend sends `data: null` and the client substitutes the
    /// documented defaults.
    pub async fn settings(&self) -> Result<AppSettings, Error> {
        let url = self.url("api/settings");
        Ok(self.get(url).await?.unwrap_or_default())
    }

    /// Apply a partial settings update.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), Error> {
        let url = self.url("api/settings");
        let _: Option<serde_json::Value> = self.put(url, update).await?;
        Ok(())
    }
}
