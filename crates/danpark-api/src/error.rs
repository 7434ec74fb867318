use thiserror::Error;

/// Top-level error type for the `danpark-api` crate.
///
/// Covers every failure mode across both API surfaces: authentication,
/// transport, the REST envelope, and the SSE push channel.
/// `danpark-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or signup rejected (wrong credentials, duplicate account, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Bearer token expired or revoked (HTTP 401 anywhere).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// An endpoint requiring auth was called before any token was installed.
    #[error("Not logged in")]
    NoToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── REST envelope ───────────────────────────────────────────────
    /// Structured error from the backend `{data, error}` envelope.
    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },

    /// Envelope carried `data: null` where a value was required.
    #[error("Response missing data field")]
    MissingData,

    // ── Push channel ────────────────────────────────────────────────
    /// SSE connection could not be established.
    #[error("Stream connection failed: {0}")]
    StreamConnect(String),

    /// SSE transport dropped mid-stream.
    #[error("Stream closed: {0}")]
    StreamClosed(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NoToken)
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::StreamConnect(_) | Self::StreamClosed(_) => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { code, .. } => code == "NOT_FOUND",
            _ => false,
        }
    }
}
