// DanPark REST HTTP client
//
// Wraps `reqwest::Client` with backend URL construction, `{ data, error }`
// envelope unwrapping, and bearer-token injection. All endpoint modules
// (auth, lots, favorites, etc.) are implemented as inherent methods via
// separate files to keep this module focused on transport mechanics.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::Envelope;
use crate::transport::TransportConfig;

/// Raw HTTP client for the DanPark backend REST API.
///
/// Handles the `{ data, error }` envelope and bearer auth. All methods
/// return unwrapped `data` payloads -- the envelope is stripped before the
/// caller sees it. The bearer token lives in a swap cell so login can
/// install it once and every in-flight clone observes it.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: ArcSwapOption<SecretString>,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// The `base_url` should be the backend root, e.g.
    /// `https://api.danpark.app` or `http://localhost:8080` in development.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url, token: ArcSwapOption::const_empty() })
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Install the bearer token used by all subsequent requests.
    pub fn set_token(&self, token: SecretString) {
        self.token.store(Some(Arc::new(token)));
    }

    /// Drop the bearer token (local logout).
    pub fn clear_token(&self) {
        self.token.store(None);
    }

    /// Whether a bearer token is currently installed.
    pub fn has_token(&self) -> bool {
        self.token.load().is_some()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for a backend path (no leading slash).
    ///
    /// Most endpoints live under `api/`, but the auth and parking-history
    /// routes are mounted at the root, so the prefix is the caller's call.
    pub(crate) fn url(&self, path: &str) -> Url {
        Url::parse(&format!("{}{path}", self.base_url)).expect("invalid API URL")
    }

    /// The SSE push-channel endpoint.
    pub fn stream_url(&self) -> Url {
        self.url("api/parking/stream")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and unwrap the envelope.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("GET {}", url);

        let resp = self.authorized(self.http.get(url)).send().await?;
        Self::parse_envelope(resp).await
    }

    /// Send a POST request with a JSON body and unwrap the envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<Option<T>, Error> {
        debug!("POST {}", url);

        let resp = self.authorized(self.http.post(url)).json(body).send().await?;
        Self::parse_envelope(resp).await
    }

    /// Send a PUT request with a JSON body and unwrap the envelope.
    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<Option<T>, Error> {
        debug!("PUT {}", url);

        let resp = self.authorized(self.http.put(url)).json(body).send().await?;
        Self::parse_envelope(resp).await
    }

    /// Send a DELETE request and unwrap the envelope.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, Error> {
        debug!("DELETE {}", url);

        let resp = self.authorized(self.http.delete(url)).send().await?;
        Self::parse_envelope(resp).await
    }

    /// Attach the bearer token, if one is installed.
    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.load().as_ref() {
            Some(token) => req.bearer_auth(token.expose_secret()),
            None => req,
        }
    }

    /// Parse the `{ data, error }` envelope.
    ///
    /// A 401 short-circuits to [`Error::SessionExpired`] before the body is
    /// touched -- expiry escalates to a session teardown, never a
    /// per-request failure. A non-null `error` field becomes
    /// [`Error::Api`] carrying the backend's code and message.
    async fn parse_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await?;

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if let Some(error) = envelope.error {
            return Err(Error::Api { code: error.code, message: error.message });
        }

        Ok(envelope.data)
    }
}
