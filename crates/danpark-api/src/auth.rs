// Credential exchange against the auth endpoints.
//
// Login yields a token pair; installing it on the client is the caller's
// job (the resume-from-keyring path installs a stored token without ever
// calling login). There is no server-side logout -- dropping the token
// and clearing stored credentials is the whole teardown.

use secrecy::{ExposeSecret, SecretString};

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::TokenPair;

impl ApiClient {
    /// Exchange credentials for an access/refresh token pair.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<TokenPair, Error> {
        let url = self.url("auth/login");
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let pair: Option<TokenPair> = match self.post(url, &body).await {
            Ok(data) => data,
            // Backend reports bad credentials through the envelope error
            // field; relabel so callers can distinguish auth rejection
            // from other API failures.
            Err(Error::Api { message, .. }) => {
                return Err(Error::Authentication { message });
            }
            Err(e) => return Err(e),
        };

        pair.ok_or_else(|| Error::Authentication { message: "login rejected".into() })
    }

    /// Register a new account. Returns the new user id.
    pub async fn signup(
        &self,
        email: &str,
        password: &SecretString,
        name: &str,
        student_id: &str,
    ) -> Result<i64, Error> {
        let url = self.url("auth/signup");
        let body = serde_json::json!({
            "email": email,
            "password": password.expose_secret(),
            "name": name,
            "studentId": student_id,
        });

        let user_id: Option<i64> = match self.post(url, &body).await {
            Ok(data) => data,
            Err(Error::Api { message, .. }) => {
                return Err(Error::Authentication { message });
            }
            Err(e) => return Err(e),
        };

        user_id.ok_or_else(|| Error::Authentication { message: "signup rejected".into() })
    }
}
