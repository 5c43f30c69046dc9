//! Activity staging: append-only JSONL files, one per day.
//!
//! Every mutating operation records a line here so day-to-day activity can be
//! inspected or replayed without touching the database.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::store::StoreResult;

#[derive(Debug, Serialize)]
struct ActivityRecord<'a> {
    timestamp: DateTime<Utc>,
    entity: &'a str,
    action: &'a str,
    data: serde_json::Value,
}

pub struct ActivityLog {
    dir: PathBuf,
    // Serializes appends so concurrent handlers never interleave lines.
    write_lock: Mutex<()>,
}

impl ActivityLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Append one record to today's `activity_YYYY_MM_DD.jsonl` file.
    pub fn record(
        &self,
        now: DateTime<Utc>,
        entity: &str,
        action: &str,
        data: serde_json::Value,
    ) -> StoreResult<()> {
        let record = ActivityRecord {
            timestamp: now,
            entity,
            action,
            data,
        };
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(err) => {
                warn!(%err, entity, action, "activity record not serializable, skipped");
                return Ok(());
            }
        };

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("activity_{}.jsonl", now.format("%Y_%m_%d")));
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn records_land_in_the_day_file_as_jsonl() {
        let dir = std::env::temp_dir().join(format!("pressbill-activity-{}", uuid::Uuid::now_v7()));
        let log = ActivityLog::new(&dir);

        let day_one = Utc.with_ymd_and_hms(2024, 8, 25, 9, 0, 0).unwrap();
        log.record(day_one, "invoice", "created", json!({"number": "INV-250824-00001"}))
            .unwrap();
        log.record(day_one, "customer", "created", json!({"phone": "9848000001"}))
            .unwrap();
        let day_two = Utc.with_ymd_and_hms(2024, 8, 26, 9, 0, 0).unwrap();
        log.record(day_two, "invoice", "deleted", json!({"number": "INV-250824-00001"}))
            .unwrap();

        let first = std::fs::read_to_string(dir.join("activity_2024_08_25.jsonl")).unwrap();
        let lines: Vec<&str> = first.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["entity"], "invoice");
        assert_eq!(parsed["action"], "created");
        assert_eq!(parsed["data"]["number"], "INV-250824-00001");

        let second = std::fs::read_to_string(dir.join("activity_2024_08_26.jsonl")).unwrap();
        assert_eq!(second.lines().count(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
