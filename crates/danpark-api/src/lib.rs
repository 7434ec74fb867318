// danpark-api: Async Rust client for the DanPark campus parking backend.

pub mod auth;
pub mod client;
pub mod error;
pub mod favorites;
pub mod history;
pub mod lots;
pub mod models;
pub mod settings;
pub mod stream;
pub mod transport;
pub mod users;

pub use client::ApiClient;
pub use error::Error;
