// ── API-to-domain type conversions ──
//
// Bridges raw `danpark_api` response types into canonical
// `danpark_core::model` domain types. Catalog records arrive with no
// user-scoped state; favorites and assignments are layered on afterwards
// by the store.

use danpark_api::models::ParkingLotDto;

use crate::model::{LotId, ParkingLot};

impl From<ParkingLotDto> for ParkingLot {
    fn from(dto: ParkingLotDto) -> Self {
        Self {
            id: LotId::from(dto.id),
            name: dto.name,
            address: dto.address,
            latitude: dto.latitude,
            longitude: dto.longitude,
            total_spaces: dto.total_spaces,
            current_parked: dto.current_parked,
            congestion_level: dto.congestion_level,
            distance_m: dto.distance,
            favorite: false,
            assignment: None,
        }
    }
}
