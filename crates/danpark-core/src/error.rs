// ── Core error types ──
//
// User-facing errors from danpark-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<danpark_api::Error>`
// impl translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

use crate::model::LotId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired")]
    SessionExpired,

    #[error("Not logged in")]
    NotConnected,

    #[error("Request timed out")]
    Timeout,

    // ── Parking state errors ─────────────────────────────────────────
    #[error("Unknown parking lot: {0}")]
    UnknownLot(LotId),

    #[error("Already parked at lot {current}")]
    AlreadyParked { current: LotId },

    #[error("Not currently parked")]
    NotParked,

    #[error("A favorite change for lot {0} is still pending")]
    FavoritePending(LotId),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("Backend error: {message}")]
    Api { message: String, code: Option<String> },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Whether this error means the stored credentials are no longer valid.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::NotConnected)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<danpark_api::Error> for CoreError {
    fn from(err: danpark_api::Error) -> Self {
        match err {
            danpark_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            danpark_api::Error::SessionExpired => CoreError::SessionExpired,
            danpark_api::Error::NoToken => CoreError::NotConnected,
            danpark_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api { message: e.to_string(), code: None }
                }
            }
            danpark_api::Error::InvalidUrl(e) => {
                CoreError::Internal(format!("invalid URL: {e}"))
            }
            danpark_api::Error::Api { code, message } => {
                CoreError::Api { message, code: Some(code) }
            }
            danpark_api::Error::MissingData => {
                CoreError::Api { message: "backend returned no data".into(), code: None }
            }
            danpark_api::Error::StreamConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("stream connection failed: {reason}"),
            },
            danpark_api::Error::StreamClosed(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("stream closed: {reason}"),
            },
            danpark_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
