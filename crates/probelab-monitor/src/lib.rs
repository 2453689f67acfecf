//! probelab-monitor — Model availability tracking for the demo backend.
//!
//! The backend unloads models after a short idle window, so "is this model
//! usable right now" is derived client-side from the `/loaded_models`
//! timestamps rather than pushed by the server. This crate keeps that
//! derivation honest:
//!
//!   * [`status::compute_status`] is a pure function of (model, snapshot,
//!     fetch-in-flight flag, clock, threshold) — the only piece with real
//!     invariants, unit-tested without timers.
//!   * [`poller::StatusPoller`] owns the refresh loop: a cancellable tokio
//!     task that refetches the snapshot on a fixed interval and publishes it
//!     over a watch channel. Fetch failures keep the last-known-good snapshot.
//!
//! Status semantics: a model absent from the snapshot is `Sleeping`; present
//! and loaded within the staleness threshold is `Online`; an outstanding
//! snapshot fetch reports `Loading` regardless of snapshot content. The
//! threshold and poll interval are configuration — deployed backends have
//! disagreed on both (80s/90s idle windows, 5s/10s refresh).

pub mod poller;
pub mod snapshot;
pub mod status;

pub use poller::{SnapshotSource, SnapshotState, StatusPoller};
pub use snapshot::ModelSnapshot;
pub use status::{compute_status, ModelStatus};
