//! Parsed form of the `/loaded_models` body.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use probelab_client::schemas::LoadedModels;
use tracing::debug;

/// One poll's worth of loaded-model state: model name → last-load instant.
/// Immutable once built; the poller replaces it wholesale on each successful
/// fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelSnapshot {
    models: HashMap<String, DateTime<Utc>>,
}

impl ModelSnapshot {
    /// Parse the wire map. Entries whose timestamp cannot be parsed are
    /// dropped, which makes the model read as absent (⇒ sleeping) rather than
    /// pinning a bogus instant on it.
    pub fn from_wire(wire: &LoadedModels) -> Self {
        let mut models = HashMap::with_capacity(wire.len());
        for (name, raw) in wire {
            match parse_timestamp(raw) {
                Some(ts) => {
                    models.insert(name.clone(), ts);
                }
                None => {
                    debug!(model = %name, timestamp = %raw, "dropping unparseable load timestamp");
                }
            }
        }
        Self { models }
    }

    pub fn last_loaded(&self, model: &str) -> Option<DateTime<Utc>> {
        self.models.get(model).copied()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn models(&self) -> impl Iterator<Item = (&str, DateTime<Utc>)> {
        self.models.iter().map(|(name, ts)| (name.as_str(), *ts))
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: &[(&str, DateTime<Utc>)]) -> Self {
        Self {
            models: entries.iter().map(|(n, t)| (n.to_string(), *t)).collect(),
        }
    }
}

/// The backend emits `datetime.now().isoformat()`, which carries no UTC
/// offset. Accept RFC 3339 when an offset is present, otherwise read the
/// naive timestamp as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .ok()
        .map(|naive| Utc.from_utc_datetime(&naive))
}
