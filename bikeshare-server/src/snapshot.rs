//! Merged station snapshot and the cache that holds it.
//!
//! A [`Snapshot`] is the complete result of one refresh cycle. The
//! [`SnapshotCache`] holds the latest one behind an `Arc`, so publishing is a
//! pointer swap and readers get a consistent value without waiting on the
//! refresh cycle.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::classify::AvailabilityStatus;

/// One station with its live counts and derived display attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct StationFeature {
    pub station_id: String,
    pub name: String,
    pub short_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub capacity: u32,

    /// All bikes available, e-bikes included.
    pub bikes_available: u32,
    /// Non-electric bikes; never negative even if the feed over-reports e-bikes.
    pub classic_bikes: u32,
    pub ebikes_available: u32,
    pub docks_available: u32,

    /// `None` when the status feed had no entry for the station.
    pub is_installed: Option<bool>,
    pub is_renting: Option<bool>,
    pub is_returning: Option<bool>,
    pub is_charging: bool,

    pub availability_status: AvailabilityStatus,
    pub marker_color: &'static str,

    /// Unix timestamp of the station's last report, if any.
    pub last_reported: Option<i64>,
}

/// System-wide totals over a snapshot's features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub total_bikes: u64,
    pub total_ebikes: u64,
    pub total_docks: u64,
    pub station_count: usize,
}

impl SystemStats {
    fn over(features: &[StationFeature]) -> Self {
        features.iter().fold(
            SystemStats {
                station_count: features.len(),
                ..SystemStats::default()
            },
            |mut acc, f| {
                acc.total_bikes += u64::from(f.bikes_available);
                acc.total_ebikes += u64::from(f.ebikes_available);
                acc.total_docks += u64::from(f.docks_available);
                acc
            },
        )
    }
}

/// The merged state of the network at one point in time.
///
/// `stats` is always computed from `features`, so the two can never
/// disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    features: Vec<StationFeature>,
    stats: SystemStats,
    last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The snapshot served before any refresh has succeeded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a snapshot from features in display order.
    pub fn new(features: Vec<StationFeature>, built_at: DateTime<Utc>) -> Self {
        let stats = SystemStats::over(&features);
        Self {
            features,
            stats,
            last_updated: Some(built_at),
        }
    }

    pub fn features(&self) -> &[StationFeature] {
        &self.features
    }

    pub fn stats(&self) -> SystemStats {
        self.stats
    }

    /// When this snapshot was built; `None` for the empty snapshot.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

/// Holds the most recently published snapshot.
///
/// Single writer (the refresh cycle), any number of readers. Both sides only
/// hold the lock long enough to clone or swap an `Arc`.
#[derive(Debug)]
pub struct SnapshotCache {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotCache {
    /// Create a cache holding the empty snapshot.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Snapshot::empty())),
        }
    }

    /// Replace the held snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        // The old snapshot may be large; free it outside the lock.
        drop(previous);
    }

    /// The latest published snapshot.
    pub fn read(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
