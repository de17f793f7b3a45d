//! Telemetry model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::opaque_id;
use super::timestamp::to_iso;

/// Raw telemetry body as posted by a zone producer
pub type TelemetryPayload = Map<String, Value>;

/// Latest telemetry per zone (zone id -> payload + `receivedAt`)
pub type TelemetrySnapshots = BTreeMap<String, Value>;

/// Field stamped on every stored snapshot
pub const RECEIVED_AT_FIELD: &str = "receivedAt";

/// Resolve the zone id of a payload: `zoneId`, falling back to `id`
pub fn zone_id_of(payload: &TelemetryPayload) -> Option<String> {
    ["zoneId", "id"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(opaque_id))
}

/// Substation named in a payload, if any
pub fn substation_of(payload: &TelemetryPayload) -> Option<String> {
    payload.get("substation").and_then(opaque_id)
}

/// Fault predicate. Depends on the payload alone, never on history.
pub fn is_break_detected(payload: &TelemetryPayload) -> bool {
    let break_flag = matches!(payload.get("breakDetected"), Some(Value::Bool(true)));
    let broken = payload.get("status").and_then(Value::as_str) == Some("broken");
    let no_current = payload
        .get("current")
        .and_then(Value::as_f64)
        .is_some_and(|current| current == 0.0);

    break_flag || broken || no_current
}

/// Build the stored snapshot: the payload as sent, plus the receipt time
pub fn snapshot_of(mut payload: TelemetryPayload, received_at: DateTime<Utc>) -> Value {
    payload.insert(RECEIVED_AT_FIELD.to_string(), Value::String(to_iso(&received_at)));
    Value::Object(payload)
}

/// Synthetic payload describing a line break, used by the simulation entrypoint
pub fn break_payload(zone_id: &str, substation: Option<&str>, now: DateTime<Utc>) -> TelemetryPayload {
    let mut payload = Map::new();
    payload.insert("zoneId".to_string(), Value::String(zone_id.to_string()));
    payload.insert(
        "substation".to_string(),
        substation.map_or(Value::Null, |s| Value::String(s.to_string())),
    );
    payload.insert("breakDetected".to_string(), Value::Bool(true));
    payload.insert("status".to_string(), Value::String("broken".to_string()));
    payload.insert("time".to_string(), Value::String(to_iso(&now)));
    payload
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryAccepted {
    pub message: &'static str,
    pub zone_id: String,
}
