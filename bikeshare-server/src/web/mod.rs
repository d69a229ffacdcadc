//! Web layer for the bike-share station service.
//!
//! Serves the cached snapshot as GeoJSON plus a health check. Handlers never
//! wait on the refresh cycle.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{cors_layer, create_router};
pub use state::AppState;
