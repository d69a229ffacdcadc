//! Application state for the web layer.

use std::sync::Arc;

use crate::snapshot::{Snapshot, SnapshotCache};

use super::dto::HealthResponse;

/// Shared application state.
///
/// Handlers only ever read from the cache; the refresh schedule owns the
/// write side.
#[derive(Clone)]
pub struct AppState {
    /// Latest published station snapshot
    pub cache: Arc<SnapshotCache>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(cache: Arc<SnapshotCache>) -> Self {
        Self { cache }
    }

    /// The current snapshot, or the empty one if no refresh has succeeded.
    pub fn get_stations(&self) -> Arc<Snapshot> {
        self.cache.read()
    }

    /// Health derived from the current snapshot. Always healthy.
    pub fn health(&self) -> HealthResponse {
        HealthResponse::from_snapshot(&self.cache.read())
    }
}
