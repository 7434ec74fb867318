//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref email) = p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if p.access_token.is_some() {
            let _ = writeln!(out, "access_token = \"****\"");
        }
        if let Some(ref env) = p.access_token_env {
            let _ = writeln!(out, "access_token_env = \"{env}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(stream) = p.stream {
            let _ = writeln!(out, "stream = {stream}");
        }
        if let Some(reconnect) = p.reconnect_secs {
            let _ = writeln!(out, "reconnect_secs = {reconnect}");
        }
    }

    out
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Store a login password in the system keyring under the profile's key.
fn store_password(profile_name: &str, password: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new("danpark", &format!("{profile_name}/password")).map_err(
        |e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to access keyring: {e}"),
        },
    )?;
    entry
        .set_password(password)
        .map_err(|e| CliError::Validation {
            field: "keyring".into(),
            reason: format!("failed to store password in keyring: {e}"),
        })?;
    Ok(())
}

fn empty_profile() -> Profile {
    Profile {
        server: String::new(),
        email: None,
        password: None,
        access_token: None,
        access_token_env: None,
        timeout: None,
        stream: None,
        reconnect_secs: None,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("✨ DanPark CLI -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(util::prompt_err)?;

            // 2. Backend URL
            let server: String = Input::new()
                .with_prompt("Backend URL")
                .default("http://localhost:8080".into())
                .interact_text()
                .map_err(util::prompt_err)?;

            // 3. Login email
            let email: String = Input::new()
                .with_prompt("Email (optional, used as login identity)")
                .allow_empty(true)
                .interact_text()
                .map_err(util::prompt_err)?;
            let email = if email.is_empty() { None } else { Some(email) };

            // 4. Password storage
            let choices = &[
                "Prompt at login (recommended)",
                "Store in system keyring",
                "Save to config file (plaintext)",
            ];
            let selection = Select::new()
                .with_prompt("How should the login password be stored?")
                .items(choices)
                .default(0)
                .interact()
                .map_err(util::prompt_err)?;

            let password = if selection == 0 {
                None
            } else {
                let pass = rpassword::prompt_password("Password: ").map_err(util::prompt_err)?;
                if pass.is_empty() {
                    return Err(CliError::Validation {
                        field: "password".into(),
                        reason: "password cannot be empty".into(),
                    });
                }
                if selection == 1 {
                    store_password(&profile_name, &pass)?;
                    eprintln!("   ✓ Password stored in system keyring");
                    None
                } else {
                    Some(pass)
                }
            };

            // 5. Merge into any existing config; other profiles survive.
            let profile = Profile {
                server,
                email,
                password,
                access_token: None,
                access_token_env: None,
                timeout: None,
                stream: None,
                reconnect_secs: None,
            };
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());

            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: danpark login");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(empty_profile);

            match key.as_str() {
                "server" => profile.server = value,
                "email" => profile.email = Some(value),
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                "stream" => {
                    profile.stream = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "stream".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "reconnect_secs" | "reconnect-secs" => {
                    profile.reconnect_secs =
                        Some(value.parse().map_err(|_| CliError::Validation {
                            field: "reconnect_secs".into(),
                            reason: "must be a number (seconds)".into(),
                        })?);
                }
                "access_token_env" | "access-token-env" => {
                    profile.access_token_env = Some(value);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: server, email, \
                             timeout, stream, reconnect_secs, access_token_env"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: danpark config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            let password = rpassword::prompt_password("Password: ").map_err(util::prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            store_password(&profile_name, &password)?;
            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
