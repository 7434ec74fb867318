// danpark-core: Reactive parking-state layer between danpark-api and consumers.

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::SessionConfig;
pub use error::CoreError;
pub use session::Session;
pub use store::ParkingStore;
pub use stream::LotStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{Assignment, CongestionLevel, LotId, ParkingLot, SortKey};

// Stream-layer types surface unchanged; the session only adds plumbing.
pub use danpark_api::stream::{ConnectionState, ParkingUpdate, ReconnectPolicy, StreamEvent};

// Account types returned by session calls.
pub use danpark_api::models::{
    AppSettings, ParkingHistory, ProfileUpdate, SettingsUpdate, Theme, TokenPair, UserProfile,
};
