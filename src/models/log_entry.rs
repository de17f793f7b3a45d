//! Event log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::opaque_id;
use super::timestamp::{iso_millis, parse_timestamp};
use crate::{AppError, AppResult};

/// Status recorded when a writer does not supply one
pub const DEFAULT_STATUS: &str = "fault";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// One immutable journal entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub zone: String,
    #[serde(default)]
    pub substation: Option<String>,
    /// Free-form; `fault`, `warning` and `ok` by convention
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(with = "iso_millis")]
    pub time: DateTime<Utc>,
}

impl LogEntry {
    /// Entry written by an automatic protective action
    pub fn fault(zone: &str, substation: Option<String>, message: &str, time: DateTime<Utc>) -> Self {
        Self {
            zone: zone.to_string(),
            substation,
            status: DEFAULT_STATUS.to_string(),
            message: message.to_string(),
            time,
        }
    }
}

/// Body of `POST /logs`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewLogEntry {
    pub zone: Option<Value>,
    pub substation: Option<Value>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub time: Option<String>,
}

impl NewLogEntry {
    /// Validate the request and fill defaults
    pub fn into_entry(self, now: DateTime<Utc>) -> AppResult<LogEntry> {
        let zone = self
            .zone
            .as_ref()
            .and_then(opaque_id)
            .ok_or_else(|| AppError::missing("zone"))?;

        let time = match self.time.as_deref() {
            Some(raw) => parse_timestamp(raw)
                .ok_or_else(|| AppError::ValidationError(format!("invalid time: {}", raw)))?,
            None => now,
        };

        Ok(LogEntry {
            zone,
            substation: self.substation.as_ref().and_then(opaque_id),
            status: self
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_status),
            message: self.message.unwrap_or_default(),
            time,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LogAppended {
    pub success: bool,
    pub entry: LogEntry,
}

/// Query string of `GET /logs`
#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Inclusive time window used to filter the journal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl LogRange {
    pub fn contains(&self, time: &DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| *time >= start) && self.end.map_or(true, |end| *time <= end)
    }
}

impl TryFrom<LogQuery> for LogRange {
    type Error = AppError;

    fn try_from(query: LogQuery) -> AppResult<Self> {
        let bound = |raw: Option<String>, name: &str| -> AppResult<Option<DateTime<Utc>>> {
            match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(raw) => parse_timestamp(raw)
                    .map(Some)
                    .ok_or_else(|| AppError::ValidationError(format!("invalid {}: {}", name, raw))),
                None => Ok(None),
            }
        };

        Ok(LogRange {
            start: bound(query.start, "start")?,
            end: bound(query.end, "end")?,
        })
    }
}

/// Query string of `GET /logs/summary`
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub days: Option<u16>,
}

/// Day-bucketed counts per zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    /// `YYYY-MM-DD`, oldest first, ending today
    pub days: Vec<String>,
    pub zones: Vec<ZoneSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub zone: String,
    /// Aligned with `LogSummary::days`
    pub counts: Vec<u32>,
    pub total: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_entry_fills_defaults() {
        let now = Utc::now();
        let req: NewLogEntry = serde_json::from_value(json!({"zone": "zoneA"})).unwrap();
        let entry = req.into_entry(now).unwrap();

        assert_eq!(entry.zone, "zoneA");
        assert_eq!(entry.status, "fault");
        assert_eq!(entry.message, "");
        assert_eq!(entry.substation, None);
        assert_eq!(entry.time, now);
    }

    #[test]
    fn test_new_entry_requires_zone() {
        let req: NewLogEntry = serde_json::from_value(json!({"message": "x"})).unwrap();
        assert!(matches!(req.into_entry(Utc::now()), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_new_entry_rejects_bad_time() {
        let req: NewLogEntry =
            serde_json::from_value(json!({"zone": "z", "time": "not a date"})).unwrap();
        assert!(req.into_entry(Utc::now()).is_err());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let t = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        let range = LogRange { start: Some(t), end: Some(t) };
        assert!(range.contains(&t));
        assert!(!range.contains(&(t + chrono::Duration::milliseconds(1))));
    }

    #[test]
    fn test_range_from_query_rejects_garbage() {
        let query = LogQuery { start: Some("soon".into()), end: None };
        assert!(LogRange::try_from(query).is_err());
    }

    #[test]
    fn test_entry_json_shape() {
        let t = parse_timestamp("2024-05-01T10:00:00Z").unwrap();
        let entry = LogEntry::fault("zoneA", None, "tripped", t);
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({
                "zone": "zoneA",
                "substation": null,
                "status": "fault",
                "message": "tripped",
                "time": "2024-05-01T10:00:00.000Z"
            })
        );
    }
}
