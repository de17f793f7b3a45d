//! Protection state model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{deserialize_truthy, opaque_id};
use super::timestamp::option_iso_millis;

/// Per-zone auto-protection record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProtectionRecord {
    /// Operator opt-in for auto-isolation
    pub enabled: bool,
    /// Set by an isolation, cleared only by disabling protection
    pub isolated: bool,
    #[serde(with = "option_iso_millis")]
    pub last_action_at: Option<DateTime<Utc>>,
}

/// Full protection mapping (zone id -> record), as persisted
pub type ProtectionStates = BTreeMap<String, ProtectionRecord>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetProtectionRequest {
    #[serde(default)]
    pub zone_id: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub enabled: bool,
}

impl SetProtectionRequest {
    pub fn zone_id(&self) -> Option<String> {
        self.zone_id.as_ref().and_then(opaque_id)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateBreakRequest {
    #[serde(default)]
    pub zone_id: Option<Value>,
    #[serde(default)]
    pub substation: Option<Value>,
}

impl SimulateBreakRequest {
    pub fn zone_id(&self) -> Option<String> {
        self.zone_id.as_ref().and_then(opaque_id)
    }

    pub fn substation(&self) -> Option<String> {
        self.substation.as_ref().and_then(opaque_id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionResponse {
    pub success: bool,
    pub zone_id: String,
    pub state: ProtectionRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    #[serde(default)]
    pub zone_id: Option<Value>,
    #[serde(default)]
    pub action: Value,
}

impl CommandRequest {
    pub fn zone_id(&self) -> Option<String> {
        self.zone_id.as_ref().and_then(opaque_id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub success: bool,
    pub zone_id: String,
    pub action: Value,
}
