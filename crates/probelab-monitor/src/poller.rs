//! Cancellable snapshot polling.
//!
//! One `StatusPoller` per consuming view: start it when the view mounts,
//! `stop()` (or just drop it) on teardown. The poller owns the only path that
//! mutates the snapshot; readers observe it through a watch channel or the
//! `status_of` convenience read.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use probelab_client::schemas::LoadedModels;
use probelab_client::InterpApiClient;
use probelab_common::Result;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::snapshot::ModelSnapshot;
use crate::status::{compute_status, ModelStatus};

/// Where snapshots come from. Separate from `InterpApiClient` so tests can
/// inject scripted fetch outcomes.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> Result<LoadedModels>;
}

#[async_trait]
impl SnapshotSource for InterpApiClient {
    async fn fetch(&self) -> Result<LoadedModels> {
        self.loaded_models().await
    }
}

/// What readers observe: the last good snapshot (if any poll has succeeded
/// yet) and whether a fetch is outstanding right now.
#[derive(Debug, Clone, Default)]
pub struct SnapshotState {
    pub snapshot: Option<ModelSnapshot>,
    pub fetch_in_flight: bool,
}

pub struct StatusPoller {
    rx: watch::Receiver<SnapshotState>,
    task: JoinHandle<()>,
    stopped: AtomicBool,
}

impl StatusPoller {
    /// Spawn the polling task. The first fetch fires immediately; subsequent
    /// fetches every `interval`.
    pub fn start(source: Arc<dyn SnapshotSource>, interval: Duration) -> Self {
        let (tx, rx) = watch::channel(SnapshotState::default());
        let task = tokio::spawn(poll_loop(source, interval, tx));
        Self {
            rx,
            task,
            stopped: AtomicBool::new(false),
        }
    }

    /// Stop polling. Idempotent. Aborting the task means a fetch that is
    /// still in flight can never publish a result afterward — observable
    /// state is frozen from this call on.
    pub fn stop(&self) {
        if !self.stopped.swap(true, Ordering::SeqCst) {
            self.task.abort();
            debug!("status poller stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Current state, cheap to clone out of the channel.
    pub fn state(&self) -> SnapshotState {
        self.rx.borrow().clone()
    }

    /// A receiver for callers that re-render on change rather than on a tick.
    pub fn subscribe(&self) -> watch::Receiver<SnapshotState> {
        self.rx.clone()
    }

    /// Derive `model`'s status from the held snapshot and the clock.
    pub fn status_of(&self, model: &str, threshold: Duration) -> ModelStatus {
        let state = self.rx.borrow();
        compute_status(
            model,
            state.snapshot.as_ref(),
            state.fetch_in_flight,
            Utc::now(),
            threshold,
        )
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
    tx: watch::Sender<SnapshotState>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        tx.send_modify(|state| state.fetch_in_flight = true);
        match source.fetch().await {
            Ok(wire) => {
                let snapshot = ModelSnapshot::from_wire(&wire);
                debug!(loaded = snapshot.len(), "snapshot refreshed");
                tx.send_modify(|state| {
                    state.snapshot = Some(snapshot);
                    state.fetch_in_flight = false;
                });
            }
            Err(e) => {
                // Stale-but-available: keep the previous snapshot and try
                // again on the next tick. No backoff.
                warn!(error = %e, "snapshot fetch failed, keeping last snapshot");
                tx.send_modify(|state| state.fetch_in_flight = false);
            }
        }
    }
}
