//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use danpark_config::ConfigError;
use danpark_core::CoreError;

/// Exit codes for process termination.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const AUTH: i32 = 4;
    pub const CONNECTION: i32 = 5;
    pub const NOT_FOUND: i32 = 6;
    pub const STATE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(danpark::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(danpark::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(danpark::auth_failed),
        help(
            "Verify your email and password, then try again.\n\
             Store a password for non-interactive use with: danpark config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("Session expired")]
    #[diagnostic(
        code(danpark::session_expired),
        help(
            "The backend rejected the stored login, so it has been cleared.\n\
             Sign in again with: danpark login"
        )
    )]
    SessionExpired,

    #[error("No stored login for profile '{profile}'")]
    #[diagnostic(
        code(danpark::not_logged_in),
        help("Sign in with: danpark login")
    )]
    NotLoggedIn { profile: String },

    #[error("No login credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(danpark::no_credentials),
        help(
            "Configure the profile with: danpark config init\n\
             Or set the DANPARK_EMAIL and DANPARK_PASSWORD environment variables."
        )
    )]
    NoCredentials { profile: String },

    // ── Parking state ────────────────────────────────────────────────

    #[error("Parking lot '{identifier}' not found")]
    #[diagnostic(
        code(danpark::lot_not_found),
        help("Run: danpark lots list to see available lots")
    )]
    LotNotFound { identifier: String },

    #[error("Already parked at lot {lot}")]
    #[diagnostic(
        code(danpark::already_parked),
        help("Only one spot can be held at a time; leave the current spot first.")
    )]
    AlreadyParked { lot: String },

    #[error("Not currently parked")]
    #[diagnostic(code(danpark::not_parked))]
    NotParked,

    #[error("A favorite change for lot {lot} is still pending")]
    #[diagnostic(
        code(danpark::favorite_pending),
        help("Wait for the in-flight change to settle and try again.")
    )]
    FavoritePending { lot: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Backend error ({code}): {message}")]
    #[diagnostic(code(danpark::api_error))]
    ApiError { code: String, message: String },

    #[error("Operation cancelled")]
    #[diagnostic(code(danpark::cancelled))]
    Cancelled,

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(danpark::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(danpark::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: danpark config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(danpark::no_config),
        help(
            "Create one with: danpark config init\n\
             Or pass --server <url>. Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(danpark::config))]
    Config(Box<ConfigError>),

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::SessionExpired
            | Self::NotLoggedIn { .. }
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::LotNotFound { .. } => exit_code::NOT_FOUND,
            Self::AlreadyParked { .. }
            | Self::NotParked
            | Self::FavoritePending { .. }
            | Self::Timeout => exit_code::STATE,
            Self::Validation { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } | Self::NoConfig { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::ApiError { .. } | Self::Cancelled | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },

            CoreError::SessionExpired => Self::SessionExpired,

            CoreError::NotConnected => Self::NotLoggedIn {
                profile: "current".into(),
            },

            CoreError::Timeout => Self::Timeout,

            CoreError::UnknownLot(id) => Self::LotNotFound {
                identifier: id.to_string(),
            },

            CoreError::AlreadyParked { current } => Self::AlreadyParked {
                lot: current.to_string(),
            },

            CoreError::NotParked => Self::NotParked,

            CoreError::FavoritePending(id) => Self::FavoritePending {
                lot: id.to_string(),
            },

            CoreError::Api { message, code } => Self::ApiError {
                code: code.unwrap_or_default(),
                message,
            },

            CoreError::Cancelled => Self::Cancelled,

            CoreError::Internal(message) => Self::ApiError {
                code: "internal".into(),
                message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotLoggedIn { profile } => Self::NotLoggedIn { profile },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => Self::ProfileNotFound {
                name: profile,
                available: "(none)".into(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}
