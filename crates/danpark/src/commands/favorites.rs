//! Favorite-lot command handlers.
//!
//! Add/remove resolve the target against the seeded catalog first, so a
//! toggle is only sent when it would actually change the state.

use crate::cli::{FavoritesArgs, FavoritesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::lots::LotRow;
use super::util::{self, Access};

pub async fn handle(args: FavoritesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FavoritesCommand::List => {
            util::with_session(global, Access::Catalog, |session| async move {
                let favorites = session.store().favorites();
                let out = output::render_list(
                    &global.output,
                    &favorites,
                    |lot| LotRow::from(lot),
                    |lot| lot.id.to_string(),
                );
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }
        FavoritesCommand::Add { lot } => set_favorite(lot, true, global).await,
        FavoritesCommand::Remove { lot } => set_favorite(lot, false, global).await,
    }
}

async fn set_favorite(
    identifier: String,
    desired: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::with_session(global, Access::Catalog, |session| async move {
        let lot = util::resolve_lot(&session, &identifier)?;
        if lot.favorite == desired {
            if !global.quiet {
                let state = if desired { "already" } else { "not" };
                eprintln!("{} is {state} a favorite", lot.name);
            }
            return Ok(());
        }

        let now_favorite = session.toggle_favorite(&lot.id).await?;
        if !global.quiet {
            if now_favorite {
                eprintln!("Added {} to favorites", lot.name);
            } else {
                eprintln!("Removed {} from favorites", lot.name);
            }
        }
        Ok(())
    })
    .await
}
