// ── Runtime session configuration ──
//
// Describes *how* to talk to a DanPark backend. Carries connection tuning
// but never touches disk -- the CLI resolves profiles/credentials and
// hands a finished `SessionConfig` in.

use std::time::Duration;

use url::Url;

use danpark_api::stream::ReconnectPolicy;

/// Configuration for one backend session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Backend root URL (e.g. `https://api.danpark.app` or
    /// `http://localhost:8080` in development).
    pub base_url: Url,
    /// REST request timeout.
    pub timeout: Duration,
    /// Open the SSE push channel after bootstrap. Disabled for one-shot
    /// CLI commands that only need a single request-response cycle.
    pub stream_enabled: bool,
    /// Reconnection policy for the push channel.
    pub reconnect: ReconnectPolicy,
}

impl SessionConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            stream_enabled: true,
            reconnect: ReconnectPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_stream(mut self, enabled: bool) -> Self {
        self.stream_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}
