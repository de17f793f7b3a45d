//! Time-bounded event journal
//!
//! Entries are kept in insertion order. Every append trims entries older than
//! the retention window and rewrites the journal file before returning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SubsecRound, Utc};
use parking_lot::Mutex;
use serde_json::Value;

use super::file::{read_json, write_json_durable};
use crate::models::timestamp::day_key;
use crate::models::{LogEntry, LogRange, LogSummary, ZoneSummary};

pub const DEFAULT_RETENTION_DAYS: u32 = 30;
pub const DEFAULT_SUMMARY_DAYS: u16 = 30;
/// Longest accepted retention window (about a century)
pub const MAX_RETENTION_DAYS: u32 = 36_500;

pub struct LogStore {
    path: PathBuf,
    retention: Duration,
    entries: Mutex<Vec<LogEntry>>,
}

impl LogStore {
    /// Load the journal from `path`, dropping entries outside the retention window
    pub fn open(path: impl Into<PathBuf>, retention_days: u32) -> Self {
        let path = path.into();
        let retention = Duration::days(i64::from(retention_days));

        let mut entries = load_entries(&path);
        let trimmed = trim(&mut entries, cutoff(Utc::now(), retention));
        tracing::info!(
            "Loaded {} log entries from {} ({} expired)",
            entries.len(),
            path.display(),
            trimmed
        );

        Self {
            path,
            retention,
            entries: Mutex::new(entries),
        }
    }

    /// Append an entry, trim expired ones and rewrite the journal.
    ///
    /// The stored time is truncated to the millisecond precision of the file.
    pub fn append(&self, mut entry: LogEntry) -> LogEntry {
        entry.time = entry.time.trunc_subsecs(3);

        let mut entries = self.entries.lock();
        entries.push(entry.clone());

        let trimmed = trim(&mut entries, cutoff(Utc::now(), self.retention));
        if trimmed > 0 {
            tracing::debug!("Trimmed {} expired log entries", trimmed);
        }

        if let Err(e) = write_json_durable(&self.path, &*entries) {
            tracing::error!("Failed to persist logs to {}: {}", self.path.display(), e);
        }

        entry
    }

    /// Entries inside `range`, in insertion order
    pub fn query(&self, range: &LogRange) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| range.contains(&entry.time))
            .cloned()
            .collect()
    }

    /// Per-zone counts for the last `days` calendar days (UTC), ending today
    pub fn summarize(&self, days: u16) -> LogSummary {
        summarize_at(&self.entries.lock(), days, Utc::now())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn load_entries(path: &Path) -> Vec<LogEntry> {
    let raw = match read_json::<Value>(path) {
        Ok(Some(Value::Array(raw))) => raw,
        Ok(Some(_)) => {
            tracing::warn!("Log file {} is not a JSON array; starting empty", path.display());
            return Vec::new();
        }
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to load logs from {}: {}", path.display(), e);
            return Vec::new();
        }
    };

    let total = raw.len();
    let entries: Vec<LogEntry> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if entries.len() < total {
        tracing::warn!(
            "Skipped {} malformed log entries in {}",
            total - entries.len(),
            path.display()
        );
    }

    entries
}

/// Oldest instant still inside the retention window
fn cutoff(now: DateTime<Utc>, retention: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(retention).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Drop entries older than `cutoff`, returning how many were removed
fn trim(entries: &mut Vec<LogEntry>, cutoff: DateTime<Utc>) -> usize {
    let before = entries.len();
    entries.retain(|entry| entry.time >= cutoff);
    before - entries.len()
}

fn summarize_at(entries: &[LogEntry], days: u16, now: DateTime<Utc>) -> LogSummary {
    let day_list: Vec<String> = (0..i64::from(days))
        .rev()
        .map(|offset| day_key(&(now - Duration::days(offset))))
        .collect();

    let day_index: HashMap<&str, usize> = day_list
        .iter()
        .enumerate()
        .map(|(i, day)| (day.as_str(), i))
        .collect();

    let mut zones: Vec<ZoneSummary> = Vec::new();
    let mut zone_index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let Some(&day) = day_index.get(day_key(&entry.time).as_str()) else {
            continue;
        };

        let slot = *zone_index.entry(entry.zone.clone()).or_insert_with(|| {
            zones.push(ZoneSummary {
                zone: entry.zone.clone(),
                counts: vec![0; day_list.len()],
                total: 0,
            });
            zones.len() - 1
        });

        let zone = &mut zones[slot];
        zone.counts[day] += 1;
        zone.total += 1;
    }

    LogSummary {
        days: day_list,
        zones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timestamp::parse_timestamp;
    use std::fs;

    fn entry(zone: &str, time: DateTime<Utc>) -> LogEntry {
        LogEntry::fault(zone, None, "test", time)
    }

    fn open(dir: &tempfile::TempDir) -> LogStore {
        LogStore::open(dir.path().join("logs.json"), DEFAULT_RETENTION_DAYS)
    }

    #[test]
    fn test_expired_entry_is_dropped_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        let now = Utc::now().trunc_subsecs(3);

        store.append(entry("zoneA", now - Duration::days(31)));
        store.append(entry("zoneA", now));

        let all = store.query(&LogRange::default());
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].time, now);
        assert_eq!(store.summarize(30).zones[0].total, 1);
    }

    #[test]
    fn test_expired_entries_are_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        let now = Utc::now().trunc_subsecs(3);
        let old = entry("zoneA", now - Duration::days(45));
        let fresh = entry("zoneB", now - Duration::days(2));
        write_json_durable(&path, &vec![old, fresh.clone()]).unwrap();

        let store = LogStore::open(&path, DEFAULT_RETENTION_DAYS);
        assert_eq!(store.query(&LogRange::default()), vec![fresh]);
    }

    #[test]
    fn test_append_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let appended = open(&dir).append(entry("zoneA", Utc::now()));

        let reloaded = open(&dir);
        assert_eq!(reloaded.query(&LogRange::default()), vec![appended]);
    }

    #[test]
    fn test_malformed_entries_are_skipped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        let good = serde_json::to_value(entry("zoneA", Utc::now())).unwrap();
        let doc = serde_json::json!([good, {"zone": "zoneB", "time": "garbage"}, 42]);
        fs::write(&path, doc.to_string()).unwrap();

        assert_eq!(LogStore::open(&path, DEFAULT_RETENTION_DAYS).len(), 1);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.json");
        fs::write(&path, "{\"zone\":").unwrap();
        assert!(LogStore::open(&path, DEFAULT_RETENTION_DAYS).is_empty());
    }

    #[test]
    fn test_query_keeps_insertion_order_and_inclusive_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let store = open(&dir);
        let now = Utc::now().trunc_subsecs(3);
        let t1 = now - Duration::hours(3);
        let t2 = now - Duration::hours(2);
        let t3 = now - Duration::hours(1);

        store.append(entry("late", t3));
        store.append(entry("early", t1));
        store.append(entry("middle", t2));

        let all: Vec<String> = store
            .query(&LogRange::default())
            .into_iter()
            .map(|e| e.zone)
            .collect();
        assert_eq!(all, vec!["late", "early", "middle"]);

        let window = LogRange { start: Some(t1), end: Some(t2) };
        let zones: Vec<String> = store.query(&window).into_iter().map(|e| e.zone).collect();
        assert_eq!(zones, vec!["early", "middle"]);
    }

    #[test]
    fn test_summary_shape_for_three_days() {
        let now = parse_timestamp("2024-06-10T12:00:00Z").unwrap();
        let summary = summarize_at(&[entry("zoneA", now)], 3, now);

        assert_eq!(summary.days, vec!["2024-06-08", "2024-06-09", "2024-06-10"]);
        assert_eq!(
            summary.zones,
            vec![ZoneSummary {
                zone: "zoneA".into(),
                counts: vec![0, 0, 1],
                total: 1,
            }]
        );
    }

    #[test]
    fn test_summary_excludes_days_outside_window() {
        let now = parse_timestamp("2024-06-10T12:00:00Z").unwrap();
        let entries = vec![
            entry("zoneA", now - Duration::days(1)),
            entry("zoneB", now - Duration::days(5)),
            entry("zoneA", now - Duration::days(5)),
            entry("zoneA", now),
        ];
        let summary = summarize_at(&entries, 3, now);

        assert_eq!(summary.zones.len(), 1);
        assert_eq!(summary.zones[0].counts, vec![0, 1, 1]);
        assert_eq!(summary.zones[0].total, 2);
    }

    #[test]
    fn test_summary_orders_zones_by_first_appearance() {
        let now = parse_timestamp("2024-06-10T12:00:00Z").unwrap();
        let entries = vec![entry("zoneB", now), entry("zoneA", now), entry("zoneB", now)];
        let summary = summarize_at(&entries, 1, now);

        let zones: Vec<(&str, u32)> = summary
            .zones
            .iter()
            .map(|z| (z.zone.as_str(), z.total))
            .collect();
        assert_eq!(zones, vec![("zoneB", 2), ("zoneA", 1)]);
    }

    #[test]
    fn test_summary_of_zero_days_is_empty() {
        let summary = summarize_at(&[entry("zoneA", Utc::now())], 0, Utc::now());
        assert!(summary.days.is_empty());
        assert!(summary.zones.is_empty());
    }

    #[test]
    fn test_huge_retention_keeps_everything() {
        let dir = tempfile::tempdir().unwrap();
        let store = LogStore::open(dir.path().join("logs.json"), u32::MAX);
        let now = Utc::now().trunc_subsecs(3);

        store.append(entry("zoneA", now - Duration::days(1000)));
        store.append(entry("zoneA", now));
        assert_eq!(store.len(), 2);

        let reloaded = LogStore::open(dir.path().join("logs.json"), u32::MAX);
        assert_eq!(reloaded.len(), 2);
    }

    #[test]
    fn test_cutoff_saturates() {
        let now = Utc::now();
        assert_eq!(cutoff(now, Duration::days(i64::from(u32::MAX))), DateTime::<Utc>::MIN_UTC);
        assert_eq!(cutoff(now, Duration::days(30)), now - Duration::days(30));
    }
}
