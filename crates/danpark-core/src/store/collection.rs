// ── Reactive lot collection ──
//
// Lock-free concurrent storage for parking-lot records with push-based
// change notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{LotId, ParkingLot};

/// A lock-free, reactive collection of parking lots.
///
/// Uses `DashMap` for O(1) concurrent lookups and `watch` channels for
/// push-based change notification. Every mutation bumps a version counter
/// and rebuilds the snapshot that subscribers receive. Snapshots list lots
/// in catalog (seed) order, so stable sorts downstream keep that order
/// for ties.
pub(crate) struct LotCollection {
    /// Primary storage: lot id -> record.
    lots: DashMap<LotId, Arc<ParkingLot>>,

    /// Position of each id in the seeded catalog, for snapshot ordering.
    rank: DashMap<LotId, usize>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full ordered snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<ParkingLot>>>>,
}

impl LotCollection {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self { lots: DashMap::new(), rank: DashMap::new(), version, snapshot }
    }

    /// Replace the whole catalog. Ranks are assigned in the order given.
    pub(crate) fn seed(&self, catalog: Vec<ParkingLot>) {
        self.lots.clear();
        self.rank.clear();

        for (position, lot) in catalog.into_iter().enumerate() {
            self.rank.insert(lot.id.clone(), position);
            self.lots.insert(lot.id.clone(), Arc::new(lot));
        }

        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Look up a lot by id.
    pub(crate) fn get(&self, id: &LotId) -> Option<Arc<ParkingLot>> {
        self.lots.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Apply a closure to the record with the given id.
    ///
    /// Returns `false` (and changes nothing) if the id is unknown; the
    /// collection never grows through this path.
    pub(crate) fn update(&self, id: &LotId, mutate: impl FnOnce(&mut ParkingLot)) -> bool {
        {
            let Some(mut entry) = self.lots.get_mut(id) else {
                return false;
            };
            let mut lot = (**entry).clone();
            mutate(&mut lot);
            *entry = Arc::new(lot);
            // Entry guard dropped here; rebuilding below iterates the map
            // and must not hold a shard lock.
        }

        self.rebuild_snapshot();
        self.bump_version();
        true
    }

    /// Get the current snapshot (cheap `Arc` clone), in catalog order.
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<ParkingLot>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<ParkingLot>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.lots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all records in catalog order and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut values: Vec<(usize, Arc<ParkingLot>)> = self
            .lots
            .iter()
            .map(|r| {
                let position = self.rank.get(r.key()).map_or(usize::MAX, |p| *p);
                (position, Arc::clone(r.value()))
            })
            .collect();
        values.sort_by_key(|(position, _)| *position);

        let ordered: Vec<Arc<ParkingLot>> = values.into_iter().map(|(_, lot)| lot).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(ordered));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}
