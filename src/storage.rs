use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    domain::Entry,
    time::{self, TimeError},
};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported entry file '{0}', expected .csv or .json")]
    UnsupportedFormat(String),
    #[error("record '{0}' has neither end_time nor duration")]
    MissingEnd(String),
    #[error("record '{instance_id}' runs past midnight")]
    EndPastMidnight { instance_id: String },
    #[error("record '{instance_id}': {source}")]
    Time {
        instance_id: String,
        #[source]
        source: TimeError,
    },
}

/// One row of an entry file as produced by the schedule store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub instance_id: String,
    #[serde(default)]
    pub day: String,
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl EntryRecord {
    /// Converts to a layout entry, deriving the end from the duration when
    /// the record carries no explicit end.
    pub fn into_entry(self) -> Result<Entry, StorageError> {
        let end_time = match (self.end_time, self.duration) {
            (Some(end), _) if !end.is_empty() => end,
            (_, Some(duration)) => {
                let start = time::minutes_from_midnight(&self.start_time).map_err(|source| {
                    StorageError::Time {
                        instance_id: self.instance_id.clone(),
                        source,
                    }
                })?;
                let end = start
                    .checked_add(duration)
                    .filter(|end| *end <= time::MINUTES_PER_DAY)
                    .ok_or_else(|| StorageError::EndPastMidnight {
                        instance_id: self.instance_id.clone(),
                    })?;
                time::time_from_minutes(end)
            }
            _ => return Err(StorageError::MissingEnd(self.instance_id)),
        };

        Ok(Entry {
            instance_id: self.instance_id,
            start_time: self.start_time,
            end_time,
            title: self.title,
            color: self.color.filter(|c| !c.is_empty()),
        })
    }

    pub fn matches_day(&self, designations: &[String]) -> bool {
        designations.iter().any(|d| self.day.eq_ignore_ascii_case(d))
    }
}

pub fn load_records(path: &Path) -> Result<Vec<EntryRecord>, StorageError> {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    let records = match extension.as_str() {
        "csv" => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)?;
            reader
                .deserialize::<EntryRecord>()
                .collect::<Result<Vec<_>, _>>()?
        }
        "json" => {
            let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&content)?
        }
        _ => return Err(StorageError::UnsupportedFormat(path.display().to_string())),
    };

    debug!(path = %path.display(), count = records.len(), "loaded entry records");
    Ok(records)
}

/// Entries for one day, in file order. An empty designation list keeps
/// every record.
pub fn entries_for_day(
    records: Vec<EntryRecord>,
    designations: &[String],
) -> Result<Vec<Entry>, StorageError> {
    records
        .into_iter()
        .filter(|record| designations.is_empty() || record.matches_day(designations))
        .map(EntryRecord::into_entry)
        .collect()
}

/// Designations that mean "today": the ISO date and the weekday name.
pub fn day_designations(date: NaiveDate) -> Vec<String> {
    vec![
        date.format("%Y-%m-%d").to_string(),
        date.weekday().to_string(),
        date.format("%A").to_string(),
    ]
}

pub fn today_designations() -> Vec<String> {
    day_designations(Local::now().date_naive())
}

pub fn atomic_write(path: &Path, content: &str) -> Result<(), StorageError> {
    let io_err = |source| StorageError::Io {
        path: path.display().to_string(),
        source,
    };

    let tmp_path = path.with_extension("tmp");
    let mut tmp_file = File::create(&tmp_path).map_err(io_err)?;
    tmp_file.write_all(content.as_bytes()).map_err(io_err)?;
    tmp_file.sync_all().map_err(io_err)?;
    fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::SystemTime};

    use super::*;

    fn unique_path(prefix: &str, extension: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("{}_{}.{}", prefix, now, extension))
    }

    #[test]
    fn test_csv_records_filter_by_day() {
        let path = unique_path("daygrid_entries", "csv");
        let content = "instance_id,day,start_time,end_time,duration,title,color\n\
                       m1,Monday,09:00,10:00,60,Maths,#ff0000\n\
                       t1,Tuesday,09:00,09:45,45,Physics,\n\
                       m2,monday,10:00,,30,Break,\n";
        fs::write(&path, content).unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 3);

        let monday = entries_for_day(records, &["Monday".to_string()]).unwrap();
        assert_eq!(monday.len(), 2);
        assert_eq!(monday[0].title, "Maths");
        assert_eq!(monday[0].color.as_deref(), Some("#ff0000"));
        assert_eq!(monday[1].instance_id, "m2");
        assert_eq!(monday[1].end_time, "10:30");
        assert_eq!(monday[1].color, None);

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_json_records_load() {
        let path = unique_path("daygrid_entries", "json");
        let content = r#"[
            {"instance_id": "a", "start_time": "08:00", "end_time": "09:00"},
            {"instance_id": "b", "start_time": "08:30", "duration": 15, "title": "Call"}
        ]"#;
        fs::write(&path, content).unwrap();

        let entries = entries_for_day(load_records(&path).unwrap(), &[]).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].end_time, "08:45");
        assert_eq!(entries[1].title, "Call");

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_record_without_end_is_rejected() {
        let record = EntryRecord {
            instance_id: "open".to_string(),
            day: String::new(),
            start_time: "09:00".to_string(),
            end_time: None,
            duration: None,
            title: String::new(),
            color: None,
        };
        assert!(matches!(
            record.into_entry(),
            Err(StorageError::MissingEnd(id)) if id == "open"
        ));
    }

    #[test]
    fn test_duration_past_midnight_is_rejected() {
        let record = |start: &str, duration: u32| EntryRecord {
            instance_id: "late".to_string(),
            day: String::new(),
            start_time: start.to_string(),
            end_time: None,
            duration: Some(duration),
            title: String::new(),
            color: None,
        };

        for (start, duration) in [("09:00", u32::MAX), ("23:00", 120), ("00:00", 1441)] {
            assert!(
                matches!(
                    record(start, duration).into_entry(),
                    Err(StorageError::EndPastMidnight { instance_id }) if instance_id == "late"
                ),
                "{start} + {duration}"
            );
        }

        let entry = record("23:00", 60).into_entry().unwrap();
        assert_eq!(entry.end_time, "24:00");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let err = load_records(Path::new("entries.txt")).unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_day_designations_cover_date_and_weekday() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let designations = day_designations(date);
        assert!(designations.contains(&"2026-10-16".to_string()));
        assert!(designations.contains(&"Friday".to_string()));
        assert!(designations.contains(&"Fri".to_string()));
    }

    #[test]
    fn test_atomic_write_replaces_content() {
        let path = unique_path("daygrid_layout_out", "json");
        atomic_write(&path, "first").unwrap();
        atomic_write(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        fs::remove_file(path).ok();
    }
}
