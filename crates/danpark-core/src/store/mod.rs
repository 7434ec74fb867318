// ── Reactive parking-state store ──
//
// Single source of truth for the session's view of lot occupancy and the
// user's favorite/parking selections. Occupancy fields are written only
// by the push-update path; favorite/assignment fields only by user
// actions. The two paths never touch each other's fields.

mod collection;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use danpark_api::stream::ParkingUpdate;

use crate::error::CoreError;
use crate::model::{Assignment, LotId, ParkingLot, SortKey};
use crate::stream::LotStream;
use collection::LotCollection;

/// Reactive store of parking lots for one session.
///
/// Thread-safe and lock-free: reads are wait-free, writes use fine-grained
/// per-shard locks inside `DashMap`. Mutations are broadcast to
/// subscribers via `watch` channels.
pub struct ParkingStore {
    lots: LotCollection,
    current_parking: watch::Sender<Option<LotId>>,
    last_update: watch::Sender<Option<DateTime<Utc>>>,
}

impl ParkingStore {
    pub fn new() -> Self {
        let (current_parking, _) = watch::channel(None);
        let (last_update, _) = watch::channel(None);

        Self { lots: LotCollection::new(), current_parking, last_update }
    }

    // ── Seeding ──────────────────────────────────────────────────────

    /// Replace the catalog wholesale. Called once at session start; any
    /// previous parking reference is discarded with the old records.
    pub fn seed(&self, catalog: Vec<ParkingLot>) {
        self.lots.seed(catalog);
        let _ = self.current_parking.send(None);
    }

    /// Mark the given lots as favorites. Unknown ids are skipped.
    ///
    /// Called once after the favorites list is fetched at session start;
    /// it only sets flags, never clears them.
    pub fn seed_favorites(&self, ids: &[LotId]) {
        for id in ids {
            if !self.lots.update(id, |lot| lot.favorite = true) {
                debug!(lot = %id, "favorite references unknown lot, skipping");
            }
        }
    }

    // ── Push-update path ─────────────────────────────────────────────

    /// Apply a remote occupancy update in place.
    ///
    /// Replaces `total_spaces`, `current_parked`, and `congestion_level`
    /// on the matching record; last write wins, ordered only by arrival.
    /// Unknown ids are a no-op: the catalog never grows through the
    /// stream. Returns whether a record was updated.
    pub fn apply_update(&self, update: &ParkingUpdate) -> bool {
        let id = LotId::from(update.id.as_str());

        let applied = self.lots.update(&id, |lot| {
            lot.total_spaces = update.total_spaces;
            lot.current_parked = update.current_parked;
            lot.congestion_level = update.congestion_level;
        });

        if applied {
            let _ = self.last_update.send(Some(Utc::now()));
        } else {
            debug!(lot = %id, "update for unknown lot dropped");
        }
        applied
    }

    // ── Favorite primitives ──────────────────────────────────────────

    /// Set the favorite flag. Returns the new value, `None` for an
    /// unknown id.
    pub fn set_favorite(&self, id: &LotId, value: bool) -> Option<bool> {
        self.lots.update(id, |lot| lot.favorite = value).then_some(value)
    }

    /// Flip the favorite flag. Returns the new value, `None` for an
    /// unknown id.
    pub fn toggle_favorite(&self, id: &LotId) -> Option<bool> {
        let mut new_value = false;
        let found = self.lots.update(id, |lot| {
            lot.favorite = !lot.favorite;
            new_value = lot.favorite;
        });
        found.then_some(new_value)
    }

    // ── Parking assignment ───────────────────────────────────────────

    /// Assign the user a spot in the given lot.
    ///
    /// At most one lot can hold an assignment per session; a second
    /// assign is rejected with [`CoreError::AlreadyParked`] naming the
    /// occupying lot.
    pub fn assign(&self, id: &LotId, spot: &str) -> Result<(), CoreError> {
        if self.lots.get(id).is_none() {
            return Err(CoreError::UnknownLot(id.clone()));
        }

        // Claim the single parking reference before touching the record.
        let mut occupied: Option<LotId> = None;
        self.current_parking.send_if_modified(|current| {
            if let Some(existing) = current {
                occupied = Some(existing.clone());
                return false;
            }
            *current = Some(id.clone());
            true
        });

        if let Some(current) = occupied {
            return Err(CoreError::AlreadyParked { current });
        }

        let assignment = Assignment { spot: spot.to_owned(), since: Utc::now() };
        self.lots.update(id, |lot| lot.assignment = Some(assignment.clone()));
        Ok(())
    }

    /// Clear the current assignment. Returns the lot that was vacated.
    pub fn clear_assignment(&self) -> Result<LotId, CoreError> {
        let mut vacated: Option<LotId> = None;
        self.current_parking.send_if_modified(|current| {
            vacated = current.take();
            vacated.is_some()
        });

        let Some(id) = vacated else {
            return Err(CoreError::NotParked);
        };

        self.lots.update(&id, |lot| lot.assignment = None);
        Ok(id)
    }

    /// The lot the user is currently parked in, if any.
    pub fn current_parking(&self) -> Option<LotId> {
        self.current_parking.borrow().clone()
    }

    /// Watch the current-parking reference.
    pub fn watch_parking(&self) -> watch::Receiver<Option<LotId>> {
        self.current_parking.subscribe()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn get(&self, id: &LotId) -> Option<Arc<ParkingLot>> {
        self.lots.get(id)
    }

    pub fn len(&self) -> usize {
        self.lots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Current catalog-ordered snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<ParkingLot>>> {
        self.lots.snapshot()
    }

    /// Subscribe to snapshot changes.
    pub fn watch(&self) -> LotStream {
        LotStream::new(self.lots.subscribe())
    }

    /// Mutation counter; bumps on every seed/update.
    pub fn version(&self) -> u64 {
        self.lots.version()
    }

    /// When the last push update was applied, if any.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.borrow()
    }

    /// Lots whose name contains `query`, case-insensitively, in catalog
    /// order.
    pub fn filter_by_name(&self, query: &str) -> Vec<Arc<ParkingLot>> {
        let needle = query.to_lowercase();
        self.snapshot()
            .iter()
            .filter(|lot| lot.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Catalog sorted under the given key. The sort is stable: equal keys
    /// keep catalog order.
    pub fn sorted_by(&self, key: SortKey) -> Vec<Arc<ParkingLot>> {
        let mut lots: Vec<Arc<ParkingLot>> = self.snapshot().iter().cloned().collect();
        lots.sort_by(|a, b| key.compare(a, b));
        lots
    }

    /// The user's favorite lots, in catalog order.
    pub fn favorites(&self) -> Vec<Arc<ParkingLot>> {
        self.snapshot().iter().filter(|lot| lot.favorite).cloned().collect()
    }
}

impl Default for ParkingStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────────────
