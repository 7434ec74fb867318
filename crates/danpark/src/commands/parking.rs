//! Park command handler.
//!
//! Claims a spot in the store, records the event against the account,
//! then holds the claim open: the assignment lives in process memory,
//! so leaving has to happen before this process exits. `--no-wait`
//! records the event and exits immediately without a leave.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;

use crate::cli::{GlobalOpts, ParkArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, Access};

pub async fn handle(args: ParkArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let access = if args.no_wait {
        Access::Catalog
    } else {
        Access::Live
    };

    util::with_session(global, access, |session| async move {
        let lot = util::resolve_lot(&session, &args.lot)?;
        session.park(&lot.id, &args.spot).await?;
        if !global.quiet {
            eprintln!("Parked at {} spot {}", lot.name, args.spot);
        }

        if args.no_wait {
            return Ok(());
        }

        if !global.quiet {
            eprintln!("Holding the spot; press Ctrl-C to leave");
        }

        let color = output::should_color(&global.color);
        let mut stream = session.store().watch();
        let mut prev = stream.latest();
        let started = Instant::now();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                snapshot = stream.changed() => {
                    let Some(snapshot) = snapshot else { break };
                    for (old, new) in prev.iter().zip(snapshot.iter()) {
                        if Arc::ptr_eq(old, new) || new.id != lot.id {
                            continue;
                        }
                        if !global.quiet {
                            eprintln!(
                                "{}  {}: {}/{} ({})",
                                Local::now().format("%H:%M:%S"),
                                new.name,
                                new.current_parked,
                                new.total_spaces,
                                output::congestion_label(new.congestion_level, color)
                            );
                        }
                    }
                    prev = snapshot;
                }
            }
        }

        session.leave()?;
        if !global.quiet {
            let held = Duration::from_secs(started.elapsed().as_secs());
            eprintln!("Left {} after {}", lot.name, humantime::format_duration(held));
        }
        Ok(())
    })
    .await
}
