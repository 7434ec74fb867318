// ── Sort keys for lot listings ──
//
// Used by the CLI to order snapshots without re-querying the backend.

use std::cmp::Ordering;

use super::ParkingLot;

/// Sort key for parking-lot listings.
///
/// All orderings are applied with a stable sort, so lots that compare
/// equal keep their catalog (seed) order. Ties are common: whole groups
/// of lots share a congestion level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Nearest first.
    #[default]
    Distance,
    /// Least congested first (여유 < 보통 < 혼잡 < 만차).
    Congestion,
    /// Most free spaces first.
    AvailableSpaces,
    /// Lexicographic by name. Code-point order, which for precomposed
    /// Hangul coincides with Korean alphabetical order.
    Name,
}

impl SortKey {
    /// Compare two lots under this key.
    pub fn compare(&self, a: &ParkingLot, b: &ParkingLot) -> Ordering {
        match self {
            Self::Distance => a
                .distance_m
                .partial_cmp(&b.distance_m)
                .unwrap_or(Ordering::Equal),
            Self::Congestion => a.congestion_level.cmp(&b.congestion_level),
            Self::AvailableSpaces => b.available_spaces().cmp(&a.available_spaces()),
            Self::Name => a.name.cmp(&b.name),
        }
    }
}
