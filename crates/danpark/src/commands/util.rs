//! Shared helpers for command handlers.

use std::future::Future;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use indicatif::ProgressBar;

use danpark_core::{LotId, ParkingLot, Session};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

/// How much of the session a command needs before its handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Authenticated REST calls only.
    Rest,
    /// REST plus a seeded lot catalog (no live stream).
    Catalog,
    /// Seeded catalog with the live occupancy stream attached.
    Live,
}

/// Run a command body inside a one-shot session.
///
/// Builds the session from config + flags, installs the stored login,
/// optionally bootstraps the catalog, runs `f`, then closes the session --
/// which also joins any background work the body spawned, so a parking
/// event recorded just before exit still lands. A stored login the
/// backend rejects is cleared from the keyring on the way out.
pub async fn with_session<F, Fut, T>(
    global: &GlobalOpts,
    access: Access,
    f: F,
) -> Result<T, CliError>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let (mut session_config, profile_name) = config::resolve_session(global)?;
    if access != Access::Live {
        session_config = session_config.with_stream(false);
    }

    let session = Session::new(session_config)?;
    session.resume(config::resolve_token(global)?);

    let result = async {
        if access != Access::Rest {
            let spinner = progress(global, "Loading parking lots");
            let bootstrapped = session.bootstrap().await;
            if let Some(bar) = spinner {
                bar.finish_and_clear();
            }
            bootstrapped?;
        }
        f(session.clone()).await
    }
    .await;

    session.close().await;

    if matches!(result, Err(CliError::SessionExpired)) {
        // Stored login is stale; clear it so the next run goes straight
        // to `danpark login`.
        let _ = danpark_config::clear_tokens(&profile_name);
    }

    result
}

/// A stderr spinner for slow startup work; `None` when quiet or piped.
pub fn progress(global: &GlobalOpts, message: &str) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner().with_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(80));
    Some(bar)
}

/// Resolve a lot identifier (id or exact name) against the seeded catalog.
pub fn resolve_lot(session: &Session, identifier: &str) -> Result<Arc<ParkingLot>, CliError> {
    let store = session.store();
    if let Some(lot) = store.get(&LotId::from(identifier)) {
        return Ok(lot);
    }
    let snap = store.snapshot();
    for lot in snap.iter() {
        if lot.name == identifier {
            return Ok(Arc::clone(lot));
        }
    }
    Err(CliError::LotNotFound {
        identifier: identifier.into(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
