//! Parking lot command handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Local;
use tabled::Tabled;

use danpark_core::{ParkingLot, SortKey};

use crate::cli::{GlobalOpts, LotListArgs, LotsArgs, LotsCommand, OutputFormat, SortOption, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, Access};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct LotRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Occupancy")]
    occupancy: String,
    #[tabled(rename = "Free")]
    free: u32,
    #[tabled(rename = "Congestion")]
    congestion: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Fav")]
    favorite: String,
}

impl From<&Arc<ParkingLot>> for LotRow {
    fn from(lot: &Arc<ParkingLot>) -> Self {
        Self {
            id: lot.id.to_string(),
            name: lot.name.clone(),
            occupancy: format!("{}/{}", lot.current_parked, lot.total_spaces),
            free: lot.available_spaces(),
            congestion: lot.congestion_level.label().to_owned(),
            distance: format_distance(lot.distance_m),
            favorite: if lot.favorite { "★".into() } else { String::new() },
        }
    }
}

fn format_distance(meters: f64) -> String {
    if meters >= 1000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{meters:.0} m")
    }
}

fn detail(lot: &Arc<ParkingLot>, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", lot.id),
        format!("Name:        {}", lot.name),
        format!("Address:     {}", lot.address),
        format!("Location:    {:.4}, {:.4}", lot.latitude, lot.longitude),
        format!(
            "Occupancy:   {}/{} ({} free)",
            lot.current_parked,
            lot.total_spaces,
            lot.available_spaces()
        ),
        format!(
            "Congestion:  {}",
            output::congestion_label(lot.congestion_level, color)
        ),
        format!("Distance:    {}", format_distance(lot.distance_m)),
        format!("Favorite:    {}", if lot.favorite { "yes" } else { "no" }),
    ];
    if let Some(assignment) = &lot.assignment {
        lines.push(format!(
            "Spot:        {} (since {})",
            assignment.spot,
            assignment.since.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        ));
    }
    lines.join("\n")
}

fn sort_key(option: SortOption) -> SortKey {
    match option {
        SortOption::Distance => SortKey::Distance,
        SortOption::Congestion => SortKey::Congestion,
        SortOption::Free => SortKey::AvailableSpaces,
        SortOption::Name => SortKey::Name,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: LotsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        LotsCommand::List(list) => handle_list(list, global).await,
        LotsCommand::Show { lot } => {
            util::with_session(global, Access::Catalog, |session| async move {
                let found = util::resolve_lot(&session, &lot)?;
                let color = output::should_color(&global.color);
                let out = output::render_single(
                    &global.output,
                    &found,
                    |l| detail(l, color),
                    |l| l.id.to_string(),
                );
                output::print_output(&out, global.quiet);
                Ok(())
            })
            .await
        }
        LotsCommand::Watch(watch) => handle_watch(watch, global).await,
    }
}

async fn handle_list(args: LotListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::with_session(global, Access::Catalog, |session| async move {
        let store = session.store();
        let mut lots: Vec<Arc<ParkingLot>> = match &args.search {
            Some(query) => store.filter_by_name(query),
            None => store.snapshot().iter().cloned().collect(),
        };
        if args.favorites {
            lots.retain(|lot| lot.favorite);
        }
        if let Some(sort) = args.sort {
            let key = sort_key(sort);
            // Stable: lots that compare equal keep their catalog order.
            lots.sort_by(|a, b| key.compare(a, b));
        }

        let out = output::render_list(
            &global.output,
            &lots,
            |lot| LotRow::from(lot),
            |lot| lot.id.to_string(),
        );
        output::print_output(&out, global.quiet);
        Ok(())
    })
    .await
}

/// Follow live occupancy updates, printing one line per changed lot.
///
/// Status transitions of the push channel go to stderr so stdout stays
/// machine-readable under `--output json`.
async fn handle_watch(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::with_session(global, Access::Live, |session| async move {
        let color = output::should_color(&global.color);
        let filter = match &args.lot {
            Some(identifier) => Some(util::resolve_lot(&session, identifier)?.id.clone()),
            None => None,
        };

        let mut connection = session.connection();
        let mut stream = session.store().watch();
        let mut prev = stream.latest();

        let initial: Vec<Arc<ParkingLot>> = prev
            .iter()
            .filter(|lot| filter.as_ref().is_none_or(|id| &lot.id == id))
            .cloned()
            .collect();
        let out = output::render_list(
            &global.output,
            &initial,
            |lot| LotRow::from(lot),
            |lot| lot.id.to_string(),
        );
        output::print_output(&out, global.quiet);

        if !global.quiet {
            eprintln!("Watching for occupancy updates (Ctrl-C to stop)");
        }

        let started = Instant::now();
        let mut updates = 0usize;
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                changed = connection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = *connection.borrow_and_update();
                    if !global.quiet {
                        eprintln!("-- stream {}", output::connection_label(state, color));
                    }
                }
                snapshot = stream.changed() => {
                    let Some(snapshot) = snapshot else { break };
                    // Updated lots get a fresh Arc; unchanged ones are shared.
                    for (old, new) in prev.iter().zip(snapshot.iter()) {
                        if Arc::ptr_eq(old, new) {
                            continue;
                        }
                        if let Some(id) = &filter {
                            if &new.id != id {
                                continue;
                            }
                        }
                        updates += 1;
                        print_update(new, &global.output, color);
                    }
                    prev = snapshot;
                }
            }
        }

        if !global.quiet {
            let elapsed = Duration::from_secs(started.elapsed().as_secs());
            eprintln!(
                "{updates} update(s) over {}",
                humantime::format_duration(elapsed)
            );
        }
        Ok(())
    })
    .await
}

fn print_update(lot: &Arc<ParkingLot>, format: &OutputFormat, color: bool) {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            println!("{}", output::render_json_compact(lot));
        }
        OutputFormat::Plain => println!("{}", lot.id),
        OutputFormat::Table | OutputFormat::Yaml => {
            println!(
                "{}  {:<20}  {:>3}/{:<3}  {}",
                Local::now().format("%H:%M:%S"),
                lot.name,
                lot.current_parked,
                lot.total_spaces,
                output::congestion_label(lot.congestion_level, color)
            );
        }
    }
}
