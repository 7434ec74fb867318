//! CLI configuration -- thin wrapper around `danpark_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --timeout, etc.).

use std::time::Duration;

use secrecy::SecretString;

use danpark_core::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use danpark_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate the active profile + global flags into a `SessionConfig`.
///
/// CLI flag overrides take priority over profile values. With no profile
/// configured, `--server` (or `DANPARK_SERVER`) alone is enough.
pub fn resolve_session(global: &GlobalOpts) -> Result<(SessionConfig, String), CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut session_config = if let Some(profile) = cfg.profiles.get(&profile_name) {
        let mut resolved = danpark_config::profile_to_session_config(profile)?;
        if let Some(ref server) = global.server {
            resolved.base_url = parse_server(server)?;
        }
        resolved
    } else if let Some(ref server) = global.server {
        SessionConfig::new(parse_server(server)?)
    } else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    if let Some(secs) = global.timeout {
        session_config = session_config.with_timeout(Duration::from_secs(secs));
    }

    Ok((session_config, profile_name))
}

/// Resolve the stored access token for the active profile.
pub fn resolve_token(global: &GlobalOpts) -> Result<SecretString, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return Ok(danpark_config::resolve_access_token(profile, &profile_name)?);
    }

    // No profile -- check the env var and any keyring entry left behind
    // by an earlier `danpark login` under this name.
    if let Ok(val) = std::env::var("DANPARK_ACCESS_TOKEN") {
        return Ok(SecretString::from(val));
    }
    if let Ok(entry) = keyring::Entry::new("danpark", &format!("{profile_name}/access-token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    Err(CliError::NotLoggedIn {
        profile: profile_name,
    })
}

fn parse_server(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {raw}"),
    })
}
