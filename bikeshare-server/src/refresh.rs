//! The refresh cycle and its schedule.
//!
//! One cycle fetches both feeds, merges them and publishes the result. A
//! failed cycle is logged and leaves the cached snapshot as it was; the next
//! scheduled tick is the retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::gbfs::{FeedSource, FetchError};
use crate::merge::{MergeError, merge};
use crate::snapshot::SnapshotCache;

/// Default time between the starts of consecutive cycles.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(180);

/// Why a refresh cycle was abandoned.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),
}

impl RefreshError {
    pub fn kind(&self) -> &'static str {
        match self {
            RefreshError::Fetch(e) => e.kind(),
            RefreshError::Merge(e) => e.kind(),
        }
    }
}

/// What a refresh attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot with this many stations was published.
    Published { stations: usize },
    /// Another cycle was already running, so this one did nothing.
    Skipped,
}

/// Runs refresh cycles against a feed source, publishing into a cache.
///
/// At most one cycle runs at a time; a trigger that arrives while a cycle is
/// in flight is skipped rather than queued.
pub struct Refresher<S> {
    source: S,
    cache: Arc<SnapshotCache>,
    in_flight: Mutex<()>,
    cycles: AtomicU64,
}

impl<S: FeedSource> Refresher<S> {
    pub fn new(source: S, cache: Arc<SnapshotCache>) -> Self {
        Self {
            source,
            cache,
            in_flight: Mutex::new(()),
            cycles: AtomicU64::new(0),
        }
    }

    #[cfg(test)]
    fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Run one fetch → merge → publish cycle.
    ///
    /// Failures are logged here; the error is also returned for callers that
    /// want it. Nothing is published unless the whole cycle succeeds.
    pub async fn refresh(&self) -> Result<CycleOutcome, RefreshError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Refresh already in progress, skipping");
            return Ok(CycleOutcome::Skipped);
        };

        let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(cycle, "Refresh cycle starting");

        match self.run_cycle().await {
            Ok(stations) => {
                info!(cycle, stations, "Snapshot published");
                Ok(CycleOutcome::Published { stations })
            }
            Err(e) => {
                error!(
                    cycle,
                    kind = e.kind(),
                    error = %e,
                    "Refresh cycle failed, keeping previous snapshot"
                );
                Err(e)
            }
        }
    }

    async fn run_cycle(&self) -> Result<usize, RefreshError> {
        let (info, status) = self.source.fetch().await?;
        let snapshot = merge(info, status, Utc::now())?;
        let stations = snapshot.stats().station_count;
        self.cache.publish(snapshot);
        Ok(stations)
    }
}

/// Handle to a running refresh schedule.
///
/// Dropping the handle also stops the schedule.
pub struct ScheduleHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ScheduleHandle {
    /// Stop the schedule.
    ///
    /// A cycle that is already running is allowed to finish; this returns
    /// once the schedule task has exited.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.task.await {
            error!(error = %e, "Refresh schedule task failed");
        }
    }
}

/// Run `refresher` every `period`, starting one period from now.
///
/// The caller is expected to have run the startup cycle already. Ticks are
/// measured start to start; a tick that falls due while a cycle is still
/// running is skipped, not queued.
///
/// # Panics
///
/// Panics if `period` is zero.
pub fn spawn_schedule<S>(refresher: Arc<Refresher<S>>, period: Duration) -> ScheduleHandle
where
    S: FeedSource + 'static,
{
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval.tick().await; // First tick is immediate, skip it

        info!(period_secs = period.as_secs(), "Refresh schedule started");
        let mut busy_until = Instant::now();
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                scheduled = interval.tick() => {
                    if scheduled < busy_until {
                        debug!("Tick fell due during the previous cycle, skipping");
                        continue;
                    }
                    // Failures are logged by the cycle; the next tick retries
                    if let Err(e) = refresher.refresh().await {
                        debug!(kind = e.kind(), "Scheduled refresh failed");
                    }
                    busy_until = Instant::now();
                }
            }
        }
        info!("Refresh schedule stopped");
    });

    ScheduleHandle {
        shutdown: Some(shutdown_tx),
        task,
    }
}
