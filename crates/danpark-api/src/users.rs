// Profile endpoints.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ProfileUpdate, UserProfile};

impl ApiClient {
    /// Fetch the authenticated user's profile.
    pub async fn me(&self) -> Result<UserProfile, Error> {
        let url = self.url("api/users/me");
        self.get(url).await?.ok_or(Error::MissingData)
    }

    /// Apply a partial profile update; returns the updated profile.
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<UserProfile, Error> {
        let url = self.url("api/users/me");
        self.put(url, update).await?.ok_or(Error::MissingData)
    }
}
