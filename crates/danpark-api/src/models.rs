// Wire types for the DanPark REST API.
//
// Every REST response is wrapped in the `{ data, error }` envelope; the
// client strips it before callers see the payload. Field names follow the
// backend's camelCase convention via serde renames.

use chrono::NaiveDateTime;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

// ── Envelope ───────────────────────────────────────────────────────

/// Response envelope wrapped around every REST body.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

/// Structured error payload inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

// ── Congestion ─────────────────────────────────────────────────────

/// Server-assigned occupancy-severity label for a parking lot.
///
/// The backend classifies occupancy into four buckets and ships the Korean
/// display label on the wire; the client renders the label as given and
/// never recomputes it from the occupancy ratio. Variant order is severity
/// order, so derived `Ord` ranks Relaxed < Normal < Congested < Full.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum CongestionLevel {
    #[serde(rename = "여유")]
    Relaxed,
    #[serde(rename = "보통")]
    Normal,
    #[serde(rename = "혼잡")]
    Congested,
    #[serde(rename = "만차")]
    Full,
}

impl CongestionLevel {
    /// The Korean wire/display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Relaxed => "여유",
            Self::Normal => "보통",
            Self::Congested => "혼잡",
            Self::Full => "만차",
        }
    }
}

impl std::fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ── Auth ───────────────────────────────────────────────────────────

/// Access/refresh token pair returned by `POST /auth/login`.
///
/// Tokens are held as [`SecretString`] so they stay out of Debug output
/// and logs; expose them only at the storage boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
}

// ── Parking lots ───────────────────────────────────────────────────

/// A catalog entry from `GET /api/parking-lots`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingLotDto {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub total_spaces: u32,
    pub current_parked: u32,
    pub congestion_level: CongestionLevel,
    /// Meters from the user's reported location, computed server-side.
    pub distance: f64,
}

// ── Users ──────────────────────────────────────────────────────────

/// Profile payload for `GET/PUT /api/users/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub student_id: String,
    #[serde(default)]
    pub department: Option<String>,
}

/// Partial profile update body; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

// ── Settings ───────────────────────────────────────────────────────

/// UI theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Dark => f.write_str("dark"),
        }
    }
}

/// User preferences from `GET /api/settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub notifications: bool,
    pub location: bool,
    pub auto_refresh: bool,
    pub theme: Theme,
}

impl Default for AppSettings {
    /// Backend defaults, used when the settings endpoint returns no data
    /// (a fresh account that has never saved preferences).
    fn default() -> Self {
        Self {
            notifications: true,
            location: true,
            auto_refresh: false,
            theme: Theme::Light,
        }
    }
}

/// Partial settings update body; only set fields are sent.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_refresh: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

// ── Parking history ────────────────────────────────────────────────

/// One recorded parking event from `GET /parking-histories`.
///
/// The backend keys history rows by its numeric lot id and reports
/// `parkedAt` as a zone-less local datetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParkingHistory {
    pub id: i64,
    pub parking_lot_id: i64,
    pub parked_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn congestion_severity_order() {
        assert!(CongestionLevel::Relaxed < CongestionLevel::Normal);
        assert!(CongestionLevel::Normal < CongestionLevel::Congested);
        assert!(CongestionLevel::Congested < CongestionLevel::Full);
    }

    #[test]
    fn congestion_wire_labels() {
        let parsed: CongestionLevel = serde_json::from_str("\"혼잡\"").unwrap();
        assert_eq!(parsed, CongestionLevel::Congested);
        assert_eq!(serde_json::to_string(&CongestionLevel::Full).unwrap(), "\"만차\"");
        assert_eq!(CongestionLevel::Relaxed.to_string(), "여유");
    }

    #[test]
    fn congestion_rejects_unknown_label() {
        assert!(serde_json::from_str::<CongestionLevel>("\"초만원\"").is_err());
    }

    #[test]
    fn envelope_with_null_fields() {
        let body = r#"{"data": null, "error": null}"#;
        let envelope: Envelope<Vec<String>> = serde_json::from_str(body).unwrap();
        assert!(envelope.data.is_none());
        assert!(envelope.error.is_none());
    }

    #[test]
    fn envelope_with_error() {
        let body = r#"{"data": null, "error": {"code": "NOT_FOUND", "message": "no such lot"}}"#;
        let envelope: Envelope<String> = serde_json::from_str(body).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.code, "NOT_FOUND");
        assert_eq!(error.message, "no such lot");
    }

    #[test]
    fn parking_lot_dto_camel_case() {
        let body = r#"{
            "id": "3",
            "name": "글로컬 주차장",
            "address": "죽전캠퍼스",
            "latitude": 37.321,
            "longitude": 127.126,
            "totalSpaces": 60,
            "currentParked": 45,
            "congestionLevel": "혼잡",
            "distance": 320.0
        }"#;
        let lot: ParkingLotDto = serde_json::from_str(body).unwrap();
        assert_eq!(lot.total_spaces, 60);
        assert_eq!(lot.current_parked, 45);
        assert_eq!(lot.congestion_level, CongestionLevel::Congested);
    }

    #[test]
    fn settings_defaults_match_backend() {
        let defaults = AppSettings::default();
        assert!(defaults.notifications);
        assert!(defaults.location);
        assert!(!defaults.auto_refresh);
        assert_eq!(defaults.theme, Theme::Light);
    }

    #[test]
    fn settings_update_skips_unset_fields() {
        let update = SettingsUpdate { theme: Some(Theme::Dark), ..SettingsUpdate::default() };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"theme":"dark"}"#);
    }

    #[test]
    fn parking_history_local_datetime() {
        let body = r#"{"id": 7, "parkingLotId": 3, "parkedAt": "2026-03-15T09:00:00"}"#;
        let entry: ParkingHistory = serde_json::from_str(body).unwrap();
        assert_eq!(entry.parking_lot_id, 3);
        assert_eq!(entry.parked_at.to_string(), "2026-03-15 09:00:00");
    }
}
