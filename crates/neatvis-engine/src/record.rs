//! Record data model and the record store seam.
//!
//! Records are owned by an external store. The engine only keeps the last
//! loaded batch around so item ids can be resolved back to records when
//! publishing selections.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Unique record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A datable item from the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier.
    pub id: RecordId,

    /// Display title.
    #[serde(default)]
    pub title: String,

    /// Start of the record's date range.
    #[serde(default, deserialize_with = "lenient_date")]
    pub start_date: Option<DateTime<Utc>>,

    /// End of the record's date range.
    #[serde(default, deserialize_with = "lenient_date")]
    pub end_date: Option<DateTime<Utc>>,

    /// Tags used for group assignment.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Record {
    /// Create an undated record.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: RecordId(id),
            title: title.into(),
            start_date: None,
            end_date: None,
            tags: Vec::new(),
        }
    }

    /// Set the start date.
    #[must_use]
    pub fn starting(mut self, start: DateTime<Utc>) -> Self {
        self.start_date = Some(start);
        self
    }

    /// Set the end date.
    #[must_use]
    pub fn ending(mut self, end: DateTime<Utc>) -> Self {
        self.end_date = Some(end);
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Check whether the record carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Check whether the record has any date at all.
    pub fn has_date(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}

/// Parse a date field, mapping anything unusable to `None`.
///
/// Accepts RFC 3339, `YYYY-MM-DD` and `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    debug!(raw, "Ignoring malformed date");
    None
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => parse_date(&s),
        _ => None,
    })
}

/// Query parameters for loading records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Only return records that have a start or end date.
    pub has_date: bool,
}

impl RecordFilter {
    /// Filter for records that can appear on a timeline.
    pub fn dated() -> Self {
        Self { has_date: true }
    }

    /// Check whether a record passes the filter.
    pub fn matches(&self, record: &Record) -> bool {
        !self.has_date || record.has_date()
    }
}

/// Source of records for the timeline.
pub trait RecordStore {
    /// Load all records matching `filter`.
    fn load_records(
        &self,
        filter: &RecordFilter,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send;
}

/// In-memory record store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
}

impl MemoryStore {
    /// Create a store holding `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl RecordStore for MemoryStore {
    fn load_records(
        &self,
        filter: &RecordFilter,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        let records = self
            .records
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        std::future::ready(Ok(records))
    }
}

/// Record store backed by a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store reading from `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordStore for JsonFileStore {
    fn load_records(
        &self,
        filter: &RecordFilter,
    ) -> impl Future<Output = Result<Vec<Record>, StoreError>> + Send {
        let path = self.path.clone();
        let filter = *filter;
        async move {
            let content = tokio::fs::read_to_string(&path).await?;
            let records: Vec<Record> = serde_json::from_str(&content).map_err(StoreError::Parse)?;
            Ok(records.into_iter().filter(|r| filter.matches(r)).collect())
        }
    }
}

/// Errors that can occur when loading records.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error reading records.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing records JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_date_formats() {
        let midnight = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2020-01-01"), Some(midnight));
        assert_eq!(parse_date("2020-01-01T00:00:00Z"), Some(midnight));
        assert_eq!(parse_date("2020-01-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(
            parse_date("2020-01-01 12:30:00"),
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 12, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2020-13-45"), None);
    }

    #[test]
    fn test_record_deserialization_is_lenient() {
        let json = r#"[
            {"id": 1, "title": "Dated", "start_date": "2020-01-01", "end_date": "2020-02-01"},
            {"id": 2, "title": "Bad", "start_date": "not a date", "end_date": 42},
            {"id": 3, "title": "Bare"}
        ]"#;
        let records: Vec<Record> = serde_json::from_str(json).unwrap();

        assert!(records[0].start_date.is_some());
        assert!(records[0].end_date.is_some());
        assert_eq!(records[1].start_date, None);
        assert_eq!(records[1].end_date, None);
        assert!(!records[2].has_date());
        assert!(records[2].tags.is_empty());
    }

    #[test]
    fn test_has_tag() {
        let record = Record::new(1, "Tagged").tagged("battle").tagged("siege");
        assert!(record.has_tag("battle"));
        assert!(record.has_tag("siege"));
        assert!(!record.has_tag("treaty"));
    }

    #[tokio::test]
    async fn test_memory_store_filters_undated() {
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let store = MemoryStore::new(vec![
            Record::new(1, "Dated").starting(start),
            Record::new(2, "Undated"),
            Record::new(3, "End only").ending(start),
        ]);

        let dated = store.load_records(&RecordFilter::dated()).await.unwrap();
        let ids: Vec<_> = dated.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(3)]);

        let all = store.load_records(&RecordFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(
            &path,
            r#"[{"id": 7, "title": "A", "start_date": "1864-11-15"}, {"id": 8, "title": "B"}]"#,
        )
        .unwrap();

        let store = JsonFileStore::new(&path);
        let records = store.load_records(&RecordFilter::dated()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId(7));
    }

    #[tokio::test]
    async fn test_json_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));
        let result = store.load_records(&RecordFilter::dated()).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }
}
