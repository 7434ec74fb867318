//! Login, logout, and signup handlers.
//!
//! These build their own sessions rather than going through
//! `util::with_session`, since there is no stored login to install yet.

use dialoguer::Input;
use secrecy::SecretString;

use danpark_core::Session;

use crate::cli::{GlobalOpts, LoginArgs, SignupArgs};
use crate::config;
use crate::error::CliError;

use super::util;

pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (session_config, profile_name) = config::resolve_session(global)?;
    let session = Session::new(session_config.with_stream(false))?;

    let cfg = config::load_config_or_default();
    let profile = cfg.profiles.get(&profile_name);

    // Email: flag, then profile, then prompt.
    let email = match args.email.or_else(|| profile.and_then(|p| p.email.clone())) {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(util::prompt_err)?,
    };

    // Password: env var / keyring / plaintext config, then prompt.
    let stored = profile.and_then(|p| {
        danpark_config::resolve_login(p, &profile_name)
            .ok()
            .map(|(_, password)| password)
    });
    let password = match stored {
        Some(password) => password,
        None => SecretString::from(
            rpassword::prompt_password("Password: ").map_err(util::prompt_err)?,
        ),
    };

    let result = session.login(&email, &password).await;
    session.close().await;
    let tokens = result?;

    danpark_config::store_tokens(&profile_name, &tokens)?;

    if !global.quiet {
        eprintln!("✓ Logged in as {email}");
        eprintln!("  Tokens stored in the system keyring for profile '{profile_name}'");
    }
    Ok(())
}

/// Clear the stored login. The backend has no logout endpoint; dropping
/// the tokens is the whole operation.
pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    if !util::confirm(
        &format!("Clear the stored login for profile '{profile_name}'?"),
        global.yes,
    )? {
        return Ok(());
    }

    danpark_config::clear_tokens(&profile_name)?;
    if !global.quiet {
        eprintln!("✓ Logged out; stored tokens cleared for profile '{profile_name}'");
    }
    Ok(())
}

pub async fn signup(args: SignupArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (session_config, _) = config::resolve_session(global)?;
    let session = Session::new(session_config.with_stream(false))?;

    let email = prompt_missing(args.email, "Email")?;
    let name = prompt_missing(args.name, "Name")?;
    let student_id = prompt_missing(args.student_id, "Student ID")?;

    let password = rpassword::prompt_password("Password: ").map_err(util::prompt_err)?;
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    let confirmation = rpassword::prompt_password("Confirm password: ").map_err(util::prompt_err)?;
    if confirmation != password {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }
    let password = SecretString::from(password);

    let result = session
        .signup(&email, &password, &name, &student_id)
        .await;
    session.close().await;
    let user_id = result?;

    if !global.quiet {
        eprintln!("✓ Account created (user id {user_id})");
        eprintln!("  Sign in with: danpark login --email {email}");
    }
    Ok(())
}

fn prompt_missing(value: Option<String>, label: &str) -> Result<String, CliError> {
    match value {
        Some(v) => Ok(v),
        None => Input::new()
            .with_prompt(label)
            .interact_text()
            .map_err(util::prompt_err),
    }
}
