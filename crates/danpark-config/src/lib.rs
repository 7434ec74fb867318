//! Shared configuration for the DanPark CLI.
//!
//! TOML profiles, stored-login resolution (keyring + env + plaintext),
//! and translation to `danpark_core::SessionConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use danpark_core::{ReconnectPolicy, SessionConfig, TokenPair};

/// Keyring service name under which secrets are filed.
const KEYRING_SERVICE: &str = "danpark";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no login credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no stored login for profile '{profile}'")]
    NotLoggedIn { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring access failed: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://danpark.dankook.ac.kr").
    pub server: String,

    /// Account email, used as the login identity.
    pub email: Option<String>,

    /// Login password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Access token (plaintext -- prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Disable the live occupancy stream.
    pub stream: Option<bool>,

    /// Override the stream reconnect interval in seconds.
    pub reconnect_secs: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "danpark", "danpark").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("danpark");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("DANPARK_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Stored login (keyring) ──────────────────────────────────────────

/// Persist a token pair in the system keyring for a profile.
pub fn store_tokens(profile_name: &str, tokens: &TokenPair) -> Result<(), ConfigError> {
    let access = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/access-token"))?;
    access.set_password(tokens.access_token.expose_secret())?;

    let refresh = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/refresh-token"))?;
    refresh.set_password(tokens.refresh_token.expose_secret())?;

    Ok(())
}

/// Remove stored tokens for a profile. Missing entries are fine.
pub fn clear_tokens(profile_name: &str) -> Result<(), ConfigError> {
    for kind in ["access-token", "refresh-token"] {
        let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{kind}"))?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Resolve the stored access token for a profile.
///
/// Chain: profile's `access_token_env` var, then `DANPARK_ACCESS_TOKEN`,
/// then the system keyring, then plaintext in the config file.
pub fn resolve_access_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.access_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Ok(val) = std::env::var("DANPARK_ACCESS_TOKEN") {
        return Ok(SecretString::from(val));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/access-token"))
    {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    if let Some(ref token) = profile.access_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NotLoggedIn {
        profile: profile_name.into(),
    })
}

/// Resolve login credentials (email + password) without prompting.
///
/// Email comes from the profile or `DANPARK_EMAIL`; the password from
/// `DANPARK_PASSWORD`, the system keyring, or plaintext in the config.
pub fn resolve_login(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var("DANPARK_EMAIL").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Ok(pw) = std::env::var("DANPARK_PASSWORD") {
        return Ok((email, SecretString::from(pw)));
    }

    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok((email, SecretString::from(pw)));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok((email, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Session config translation ──────────────────────────────────────

/// Build a `SessionConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_session_config(profile: &Profile) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;

    let mut config = SessionConfig::new(url);

    if let Some(timeout) = profile.timeout {
        config = config.with_timeout(Duration::from_secs(timeout));
    }
    if let Some(enabled) = profile.stream {
        config = config.with_stream(enabled);
    }
    if let Some(secs) = profile.reconnect_secs {
        let interval = Duration::from_secs(secs);
        config = config.with_reconnect(ReconnectPolicy {
            interval,
            max_interval: interval,
            ..ReconnectPolicy::default()
        });
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn bare_profile(server: &str) -> Profile {
        Profile {
            server: server.into(),
            email: None,
            password: None,
            access_token: None,
            access_token_env: None,
            timeout: None,
            stream: None,
            reconnect_secs: None,
        }
    }

    #[test]
    fn test_profile_translates_with_defaults() {
        let profile = bare_profile("https://danpark.dankook.ac.kr");
        let config = profile_to_session_config(&profile).unwrap();

        assert_eq!(config.base_url.as_str(), "https://danpark.dankook.ac.kr/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.stream_enabled);
        assert_eq!(config.reconnect.interval, Duration::from_millis(3000));
    }

    #[test]
    fn test_profile_overrides_apply() {
        let mut profile = bare_profile("http://localhost:8080");
        profile.timeout = Some(5);
        profile.stream = Some(false);
        profile.reconnect_secs = Some(10);

        let config = profile_to_session_config(&profile).unwrap();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.stream_enabled);
        assert_eq!(config.reconnect.interval, Duration::from_secs(10));
        assert_eq!(config.reconnect.max_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_server_url_is_rejected() {
        let profile = bare_profile("not a url");
        let result = profile_to_session_config(&profile);

        match result {
            Err(ConfigError::Validation { ref field, .. }) => assert_eq!(field, "server"),
            other => panic!("expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();

        assert_eq!(parsed.default_profile.as_deref(), Some("default"));
        assert_eq!(parsed.defaults.output, "table");
        assert_eq!(parsed.defaults.timeout, 30);
    }
}
