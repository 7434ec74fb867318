// ── Parking domain model ──
//
// Canonical representation of a campus parking lot as consumers (CLI)
// see it: the backend's occupancy data merged with the user's local
// favorite/assignment state.

pub mod lot;
pub mod sort;

// ── Re-exports ──────────────────────────────────────────────────────

pub use lot::{Assignment, LotId, ParkingLot};
pub use sort::SortKey;

// The congestion vocabulary is defined at the wire layer (Korean serde
// labels, severity-ordered) and used unchanged in the domain.
pub use danpark_api::models::CongestionLevel;
