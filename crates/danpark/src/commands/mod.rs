//! Command dispatch: bridges CLI args -> session operations -> output.

pub mod auth;
pub mod config_cmd;
pub mod favorites;
pub mod history;
pub mod lots;
pub mod me;
pub mod parking;
pub mod settings;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(args, global).await,
        Command::Logout => auth::logout(global),
        Command::Signup(args) => auth::signup(args, global).await,
        Command::Lots(args) => lots::handle(args, global).await,
        Command::Favorites(args) => favorites::handle(args, global).await,
        Command::Park(args) => parking::handle(args, global).await,
        Command::Me(args) => me::handle(args, global).await,
        Command::Settings(args) => settings::handle(args, global).await,
        Command::History(args) => history::handle(args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
