//! Parking history command handler.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tabled::Tabled;

use danpark_core::{LotId, ParkingHistory, ParkingStore};

use crate::cli::{GlobalOpts, HistoryArgs};
use crate::error::CliError;
use crate::output;

use super::util::{self, Access};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Ago")]
    ago: String,
    #[tabled(rename = "Lot")]
    lot: String,
}

fn to_row(entry: &ParkingHistory, store: &ParkingStore) -> HistoryRow {
    // History rows carry the numeric lot id; the catalog has the name.
    let lot = store
        .get(&LotId::from(entry.parking_lot_id.to_string()))
        .map_or_else(
            || format!("#{}", entry.parking_lot_id),
            |l| l.name.clone(),
        );
    HistoryRow {
        when: entry.parked_at.format("%Y-%m-%d %H:%M").to_string(),
        ago: age(entry.parked_at),
        lot,
    }
}

/// Human-readable age, truncated to whole minutes. `parkedAt` comes from
/// the backend without a zone, so compare against naive local time; a
/// timestamp in the future renders as "-".
fn age(parked_at: NaiveDateTime) -> String {
    let Ok(elapsed) = (Local::now().naive_local() - parked_at).to_std() else {
        return "-".into();
    };
    if elapsed.as_secs() < 60 {
        return "just now".into();
    }
    let minutes = Duration::from_secs(elapsed.as_secs() / 60 * 60);
    format!("{} ago", humantime::format_duration(minutes))
}

pub async fn handle(args: HistoryArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Catalog access so numeric lot ids resolve to display names.
    util::with_session(global, Access::Catalog, |session| async move {
        let mut entries = session.history().await?;
        entries.sort_by(|a, b| b.parked_at.cmp(&a.parked_at));
        if let Some(limit) = args.limit {
            entries.truncate(limit);
        }

        let store = session.store();
        let out = output::render_list(
            &global.output,
            &entries,
            |entry| to_row(entry, store),
            |entry| entry.id.to_string(),
        );
        output::print_output(&out, global.quiet);
        Ok(())
    })
    .await
}
