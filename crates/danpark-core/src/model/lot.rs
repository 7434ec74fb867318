// ── Parking lot domain types ──

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CongestionLevel;

// ── LotId ───────────────────────────────────────────────────────────

/// Canonical identifier for a parking lot.
///
/// The catalog and push channel use opaque string ids; the history
/// endpoints use the backend's numeric ids. This wraps the string form --
/// converting to the numeric form happens at the history boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LotId(String);

impl LotId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The backend's numeric form of this id, if it has one.
    pub fn as_numeric(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for LotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LotId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<String> for LotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LotId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── Assignment ──────────────────────────────────────────────────────

/// The user's active parking assignment within a lot.
///
/// Existing iff the user is parked there, so the spot number and start
/// time cannot drift out of sync with the parked flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Spot label, e.g. `"B2-17"`.
    pub spot: String,
    /// When the assignment was made (client clock).
    pub since: DateTime<Utc>,
}

// ── ParkingLot ──────────────────────────────────────────────────────

/// The canonical parking lot record.
///
/// Occupancy fields (`total_spaces`, `current_parked`, `congestion_level`)
/// are owned by the push channel; `favorite` and `assignment` are owned by
/// user actions. The two field families never share a writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: LotId,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    // Occupancy (backend-reported; congestion is classified server-side,
    // never recomputed from the ratio here)
    pub total_spaces: u32,
    pub current_parked: u32,
    pub congestion_level: CongestionLevel,

    /// Meters from the user's location, supplied by the catalog.
    pub distance_m: f64,

    // User-scoped state
    pub favorite: bool,
    pub assignment: Option<Assignment>,
}

impl ParkingLot {
    /// Free spaces right now.
    pub fn available_spaces(&self) -> u32 {
        self.total_spaces.saturating_sub(self.current_parked)
    }

    /// Whether the user currently occupies a spot in this lot.
    pub fn is_parked(&self) -> bool {
        self.assignment.is_some()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn lot_id_round_trips_string_forms() {
        let id: LotId = "3".parse().unwrap();
        assert_eq!(id.as_str(), "3");
        assert_eq!(id.to_string(), "3");
        assert_eq!(id.as_numeric(), Some(3));
    }

    #[test]
    fn non_numeric_lot_id_has_no_numeric_form() {
        let id = LotId::from("glocal-west");
        assert_eq!(id.as_numeric(), None);
    }

    #[test]
    fn available_spaces_saturates() {
        let lot = ParkingLot {
            id: LotId::from("1"),
            name: "글로컬산학협력관 주차장".into(),
            address: "죽전캠퍼스".into(),
            latitude: 37.32,
            longitude: 127.12,
            total_spaces: 60,
            // Backend glitch: more cars than spaces must not underflow.
            current_parked: 65,
            congestion_level: CongestionLevel::Full,
            distance_m: 100.0,
            favorite: false,
            assignment: None,
        };

        assert_eq!(lot.available_spaces(), 0);
        assert!(!lot.is_parked());
    }
}
