// Shared transport configuration for building reqwest::Client instances.
//
// REST calls and the SSE stream share connect settings but differ on
// timeouts: a REST request is bounded end to end, while an SSE response
// body stays open indefinitely, so the stream client only bounds the
// connect phase.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("danpark-cli/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total request timeout for REST calls. Default: 30s.
    pub timeout: Duration,

    /// TCP connect timeout, applied to both clients. Default: 10s.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` for REST requests.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(client)
    }

    /// Build a `reqwest::Client` for the SSE stream.
    ///
    /// No total timeout -- the response body is a long-lived event stream
    /// and must not be cut off by the REST deadline.
    pub fn build_stream_client(&self) -> Result<reqwest::Client, Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(client)
    }
}
