//! Protection state store
//!
//! Holds one `ProtectionRecord` per zone and rewrites the whole mapping to
//! disk on every change. A missing or unreadable file starts the store empty.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::file::{read_json, write_json_durable};
use crate::models::{ProtectionRecord, ProtectionStates};

pub struct ProtectionStore {
    path: PathBuf,
    records: Mutex<ProtectionStates>,
}

impl ProtectionStore {
    /// Load the store from `path`
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        let records = match read_json::<ProtectionStates>(&path) {
            Ok(Some(records)) => {
                tracing::info!("Loaded protection state for {} zones from {}", records.len(), path.display());
                records
            }
            Ok(None) => ProtectionStates::new(),
            Err(e) => {
                tracing::warn!("Failed to load protection state from {}: {}", path.display(), e);
                ProtectionStates::new()
            }
        };

        Self {
            path,
            records: Mutex::new(records),
        }
    }

    pub fn get(&self, zone_id: &str) -> Option<ProtectionRecord> {
        self.records.lock().get(zone_id).cloned()
    }

    pub fn get_all(&self) -> ProtectionStates {
        self.records.lock().clone()
    }

    /// Replace the record of a zone
    pub fn set(&self, zone_id: &str, record: ProtectionRecord) {
        let mut records = self.records.lock();
        records.insert(zone_id.to_string(), record);
        self.persist(&records);
    }

    /// Get-or-create the record of a zone and mutate it, as one critical section.
    ///
    /// Returns the record after `f` ran together with `f`'s result. The mapping
    /// is persisted when the record was created or changed.
    pub fn update<R>(&self, zone_id: &str, f: impl FnOnce(&mut ProtectionRecord) -> R) -> (ProtectionRecord, R) {
        let mut records = self.records.lock();

        let created = !records.contains_key(zone_id);
        let record = records.entry(zone_id.to_string()).or_default();
        let before = record.clone();
        let outcome = f(record);
        let changed = created || *record != before;
        let current = record.clone();

        if created {
            tracing::debug!(zone = zone_id, "Protection record initialised");
        }
        if changed {
            self.persist(&records);
        }

        (current, outcome)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Best-effort: the in-memory change stands even if the write fails.
    fn persist(&self, records: &ProtectionStates) {
        if let Err(e) = write_json_durable(&self.path, records) {
            tracing::error!("Failed to persist protection state to {}: {}", self.path.display(), e);
        }
    }
}
