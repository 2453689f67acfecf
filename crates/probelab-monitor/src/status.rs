//! Pure status derivation.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::ModelSnapshot;

/// Display status for one model. `Loading` means a snapshot fetch is in
/// flight, not that the model itself is mid-load — the backend gives us no
/// per-model load progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loading,
    Online,
    Sleeping,
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelStatus::Loading => write!(f, "loading"),
            ModelStatus::Online => write!(f, "online"),
            ModelStatus::Sleeping => write!(f, "sleeping"),
        }
    }
}

/// Derive the display status for `model` from a snapshot and a clock read.
///
/// Rules, in order:
///   1. a fetch in flight is `Loading`, whatever the snapshot says;
///   2. no snapshot, or model absent from it, is `Sleeping`;
///   3. otherwise `Online` iff the model was loaded within `threshold` of
///      `now` (boundary inclusive: age == threshold is still online).
///
/// A timestamp in the future (clock skew between us and the backend) counts
/// as online. Pure function; recompute freely on every render or tick.
pub fn compute_status(
    model: &str,
    snapshot: Option<&ModelSnapshot>,
    fetch_in_flight: bool,
    now: DateTime<Utc>,
    threshold: Duration,
) -> ModelStatus {
    if fetch_in_flight {
        return ModelStatus::Loading;
    }
    let Some(loaded_at) = snapshot.and_then(|s| s.last_loaded(model)) else {
        return ModelStatus::Sleeping;
    };
    let age = now.signed_duration_since(loaded_at);
    let threshold = chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::MAX);
    if age <= threshold {
        ModelStatus::Online
    } else {
        ModelStatus::Sleeping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    const THRESHOLD: Duration = Duration::from_secs(80);

    fn snapshot_with_age(model: &str, age_secs: i64) -> (ModelSnapshot, DateTime<Utc>) {
        let now = Utc::now();
        let snapshot = ModelSnapshot::from_entries(&[(model, now - ChronoDuration::seconds(age_secs))]);
        (snapshot, now)
    }

    #[test]
    fn test_fetch_in_flight_wins_over_everything() {
        let (snapshot, now) = snapshot_with_age("gpt2-small", 30);
        assert_eq!(
            compute_status("gpt2-small", Some(&snapshot), true, now, THRESHOLD),
            ModelStatus::Loading
        );
        assert_eq!(
            compute_status("gpt2-small", None, true, now, THRESHOLD),
            ModelStatus::Loading
        );
    }

    #[test]
    fn test_fresh_timestamp_is_online() {
        let (snapshot, now) = snapshot_with_age("gpt2-small", 30);
        assert_eq!(
            compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD),
            ModelStatus::Online
        );
    }

    #[test]
    fn test_stale_timestamp_is_sleeping() {
        let (snapshot, now) = snapshot_with_age("gpt2-small", 200);
        assert_eq!(
            compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD),
            ModelStatus::Sleeping
        );
    }

    #[test]
    fn test_boundary_age_is_online() {
        // age == threshold exactly: inclusive.
        let (snapshot, now) = snapshot_with_age("gpt2-small", 80);
        assert_eq!(
            compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD),
            ModelStatus::Online
        );
        let (snapshot, now) = snapshot_with_age("gpt2-small", 81);
        assert_eq!(
            compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD),
            ModelStatus::Sleeping
        );
    }

    #[test]
    fn test_absent_model_is_sleeping() {
        let (snapshot, now) = snapshot_with_age("gpt2-small", 30);
        assert_eq!(
            compute_status("gemma-2b", Some(&snapshot), false, now, THRESHOLD),
            ModelStatus::Sleeping
        );
    }

    #[test]
    fn test_empty_or_missing_snapshot_is_sleeping() {
        let now = Utc::now();
        let empty = ModelSnapshot::default();
        assert_eq!(
            compute_status("gpt2-small", Some(&empty), false, now, THRESHOLD),
            ModelStatus::Sleeping
        );
        assert_eq!(
            compute_status("gpt2-small", None, false, now, THRESHOLD),
            ModelStatus::Sleeping
        );
    }

    #[test]
    fn test_future_timestamp_is_online() {
        let (snapshot, now) = snapshot_with_age("gpt2-small", -10);
        assert_eq!(
            compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD),
            ModelStatus::Online
        );
    }

    #[test]
    fn test_pure_and_idempotent() {
        let (snapshot, now) = snapshot_with_age("gpt2-small", 30);
        let first = compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD);
        let second = compute_status("gpt2-small", Some(&snapshot), false, now, THRESHOLD);
        assert_eq!(first, second);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ModelStatus::Online).unwrap(), "\"online\"");
        assert_eq!(ModelStatus::Sleeping.to_string(), "sleeping");
    }
}
