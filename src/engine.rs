//! Auto-protection decision engine
//!
//! Owns the live telemetry snapshots and drives the protection and log
//! stores. Real telemetry and simulated breaks run through the same
//! `process` path so both obey the same isolation rule.

use chrono::{SubsecRound, Utc};
use parking_lot::Mutex;

use crate::config::Config;
use crate::models::{
    break_payload, is_break_detected, snapshot_of, substation_of, LogEntry, ProtectionRecord,
    ProtectionStates, TelemetryPayload, TelemetrySnapshots,
};
use crate::store::{LogStore, ProtectionStore};
use crate::{AppError, AppResult};

/// Where the fault report that led to an isolation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationSource {
    Telemetry,
    Simulation,
}

impl IsolationSource {
    /// Message written to the event log on isolation
    pub fn message(self) -> &'static str {
        match self {
            IsolationSource::Telemetry => "Auto-isolation triggered due to line break detection",
            IsolationSource::Simulation => "Auto-isolation performed (simulation)",
        }
    }
}

/// Isolate only on a fault, with protection enabled, and not already isolated
pub fn should_isolate(record: &ProtectionRecord, break_detected: bool) -> bool {
    break_detected && record.enabled && !record.isolated
}

#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub zone_id: String,
    /// True when this event caused a new isolation
    pub isolated_now: bool,
    pub state: ProtectionRecord,
}

pub struct DecisionEngine {
    snapshots: Mutex<TelemetrySnapshots>,
    protection: ProtectionStore,
    logs: LogStore,
}

impl DecisionEngine {
    pub fn new(protection: ProtectionStore, logs: LogStore) -> Self {
        Self {
            snapshots: Mutex::new(TelemetrySnapshots::new()),
            protection,
            logs,
        }
    }

    /// Open both durable stores at the locations named by `config`
    pub fn open(config: &Config) -> Self {
        Self::new(
            ProtectionStore::open(config.protection_file()),
            LogStore::open(config.logs_file(), config.log_retention_days),
        )
    }

    /// Record telemetry for a zone and isolate it if the payload reports a fault
    pub fn ingest(&self, zone_id: &str, payload: TelemetryPayload) -> AppResult<IngestOutcome> {
        self.process(zone_id, payload, IsolationSource::Telemetry)
    }

    /// Inject a synthetic line break for a zone
    pub fn simulate_break(&self, zone_id: &str, substation: Option<&str>) -> AppResult<IngestOutcome> {
        let payload = break_payload(zone_id, substation, Utc::now());
        self.process(zone_id, payload, IsolationSource::Simulation)
    }

    /// Turn auto-protection on or off. Disabling also clears any isolation.
    pub fn set_protection(&self, zone_id: &str, enabled: bool) -> AppResult<ProtectionRecord> {
        if zone_id.is_empty() {
            return Err(AppError::missing("zoneId"));
        }

        let now = Utc::now().trunc_subsecs(3);
        let (state, was_isolated) = self.protection.update(zone_id, |record| {
            let was_isolated = record.isolated;
            record.enabled = enabled;
            if !enabled {
                record.isolated = false;
                record.last_action_at = Some(now);
            }
            was_isolated
        });

        if was_isolated && !enabled {
            tracing::info!(zone = zone_id, "Protection disabled; isolation cleared");
        } else {
            tracing::info!(zone = zone_id, enabled, "Protection updated");
        }

        Ok(state)
    }

    pub fn snapshots(&self) -> TelemetrySnapshots {
        self.snapshots.lock().clone()
    }

    pub fn protection_states(&self) -> ProtectionStates {
        self.protection.get_all()
    }

    pub fn protection(&self) -> &ProtectionStore {
        &self.protection
    }

    pub fn logs(&self) -> &LogStore {
        &self.logs
    }

    fn process(
        &self,
        zone_id: &str,
        payload: TelemetryPayload,
        source: IsolationSource,
    ) -> AppResult<IngestOutcome> {
        if zone_id.is_empty() {
            return Err(AppError::missing("zoneId"));
        }

        let now = Utc::now().trunc_subsecs(3);
        let break_detected = is_break_detected(&payload);
        let substation = substation_of(&payload);
        let field_count = payload.len();

        self.snapshots
            .lock()
            .insert(zone_id.to_string(), snapshot_of(payload, now));

        // Check-and-set and the journal append run under the protection
        // store's lock, so no disable can land between them.
        let (state, isolated_now) = self.protection.update(zone_id, |record| {
            if !should_isolate(record, break_detected) {
                return false;
            }
            record.isolated = true;
            record.last_action_at = Some(now);
            self.logs
                .append(LogEntry::fault(zone_id, substation, source.message(), now));
            true
        });

        if isolated_now {
            tracing::info!(zone = zone_id, ?source, "Auto-isolation performed");
        }

        tracing::debug!(zone = zone_id, fields = field_count, break_detected, "Telemetry received");

        Ok(IngestOutcome {
            zone_id: zone_id.to_string(),
            isolated_now,
            state,
        })
    }
}
