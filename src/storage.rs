use crate::models::{ActivityRecord, NewActivity};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("record rejected: {0}")]
    Rejected(String),
    #[error("storage i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// `logged_at >= from`, and `logged_at < until` when an upper bound is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggedAtRange {
    pub from: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl LoggedAtRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && self.until.is_none_or(|until| instant < until)
    }
}

/// Append-only table of activity records.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn insert(&self, activity: NewActivity) -> Result<ActivityRecord, PersistenceError>;

    /// Records inside `range`, newest `logged_at` first.
    async fn select_range(&self, range: LoggedAtRange) -> Result<Vec<ActivityRecord>, PersistenceError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    pub activities: Vec<ActivityRecord>,
}

impl StoreData {
    fn select(&self, range: LoggedAtRange) -> Vec<ActivityRecord> {
        let mut selected: Vec<ActivityRecord> = self
            .activities
            .iter()
            .filter(|record| range.contains(record.logged_at))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps.
        selected.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        selected
    }
}

/// Store-side checks, mirroring the table constraints.
fn build_record(activity: NewActivity) -> Result<ActivityRecord, PersistenceError> {
    if !activity.value.is_finite() || activity.value <= 0.0 {
        return Err(PersistenceError::Rejected(format!(
            "value must be a positive number, got {}",
            activity.value
        )));
    }
    if activity.notes.as_deref().is_some_and(str::is_empty) {
        return Err(PersistenceError::Rejected("notes must not be empty".to_string()));
    }

    Ok(ActivityRecord {
        id: Uuid::new_v4(),
        activity_type: activity.activity_type,
        value: activity.value,
        logged_at: activity.logged_at,
        notes: activity.notes,
        created_at: Utc::now(),
    })
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(activities: Vec<ActivityRecord>) -> Self {
        Self {
            data: Mutex::new(StoreData { activities }),
        }
    }
}

#[async_trait]
impl ActivityStore for MemoryStore {
    async fn insert(&self, activity: NewActivity) -> Result<ActivityRecord, PersistenceError> {
        let record = build_record(activity)?;
        self.data.lock().await.activities.push(record.clone());
        Ok(record)
    }

    async fn select_range(&self, range: LoggedAtRange) -> Result<Vec<ActivityRecord>, PersistenceError> {
        Ok(self.data.lock().await.select(range))
    }
}

/// Whole table kept in memory and rewritten to a JSON file on every insert.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let data = load_data(&path).await?;
        debug!(path = %path.display(), records = data.activities.len(), "opened activity store");

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivityStore for JsonFileStore {
    async fn insert(&self, activity: NewActivity) -> Result<ActivityRecord, PersistenceError> {
        let record = build_record(activity)?;
        let mut data = self.data.lock().await;
        data.activities.push(record.clone());

        if let Err(err) = persist_data(&self.path, &data).await {
            data.activities.pop();
            return Err(err);
        }

        Ok(record)
    }

    async fn select_range(&self, range: LoggedAtRange) -> Result<Vec<ActivityRecord>, PersistenceError> {
        Ok(self.data.lock().await.select(range))
    }
}

pub async fn load_data(path: &Path) -> Result<StoreData, PersistenceError> {
    match fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|err| {
            error!("failed to parse data file {}: {err}", path.display());
            PersistenceError::Encoding(err)
        }),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("data file {} not found, starting empty", path.display());
            Ok(StoreData::default())
        }
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            Err(PersistenceError::Io(err))
        }
    }
}

/// Writes a `.tmp` sibling, syncs it, then renames it over `path`, so a crash
/// mid-write leaves the previous file intact.
pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), PersistenceError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let temp_path = path.with_extension("tmp");

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .await?;
    file.write_all(&payload).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(err) = fs::rename(&temp_path, path).await {
        fs::remove_file(&temp_path).await.ok();
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityType;
    use chrono::{Duration, TimeZone};

    fn unique_data_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("health_tracker_store_{}_{}", std::process::id(), nanos));
        path.push("activities.json");
        path
    }

    fn new_activity(activity_type: ActivityType, value: f64, logged_at: DateTime<Utc>) -> NewActivity {
        NewActivity {
            activity_type,
            value,
            notes: None,
            logged_at,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_created_at() {
        let store = MemoryStore::new();
        let before = Utc::now();
        let record = store
            .insert(new_activity(ActivityType::Water, 2.0, at(9)))
            .await
            .unwrap();
        assert!(record.created_at >= before);
        assert_eq!(record.logged_at, at(9));

        let other = store
            .insert(new_activity(ActivityType::Water, 2.0, at(9)))
            .await
            .unwrap();
        assert_ne!(record.id, other.id);
    }

    #[tokio::test]
    async fn insert_rejects_non_positive_values() {
        let store = MemoryStore::new();
        for value in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = store
                .insert(new_activity(ActivityType::Steps, value, at(9)))
                .await
                .unwrap_err();
            assert!(matches!(err, PersistenceError::Rejected(_)));
        }
        let all = LoggedAtRange { from: at(0) - Duration::days(1), until: None };
        assert!(store.select_range(all).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn insert_rejects_empty_notes() {
        let store = MemoryStore::new();
        let mut activity = new_activity(ActivityType::Sleep, 8.0, at(7));
        activity.notes = Some(String::new());
        let err = store.insert(activity).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Rejected(_)));
    }

    #[tokio::test]
    async fn select_range_filters_and_orders_newest_first() {
        let store = MemoryStore::new();
        for hour in [8, 12, 10, 23] {
            store
                .insert(new_activity(ActivityType::Water, 1.0, at(hour)))
                .await
                .unwrap();
        }

        let range = LoggedAtRange { from: at(9), until: Some(at(23)) };
        let selected = store.select_range(range).await.unwrap();
        let hours: Vec<_> = selected.iter().map(|r| r.logged_at).collect();
        assert_eq!(hours, vec![at(12), at(10)]);

        let open_ended = LoggedAtRange { from: at(10), until: None };
        let selected = store.select_range(open_ended).await.unwrap();
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].logged_at, at(23));
    }

    #[tokio::test]
    async fn json_store_persists_across_reopen() {
        let path = unique_data_path();
        let store = JsonFileStore::open(&path).await.unwrap();
        let mut activity = new_activity(ActivityType::Sleep, 7.5, at(6));
        activity.notes = Some("slept well".to_string());
        let record = store.insert(activity).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let range = LoggedAtRange { from: at(0), until: None };
        let records = reopened.select_range(range).await.unwrap();
        assert_eq!(records, vec![record]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn json_store_missing_file_is_empty() {
        let path = unique_data_path();
        let store = JsonFileStore::open(&path).await.unwrap();
        let range = LoggedAtRange { from: at(0), until: None };
        assert!(store.select_range(range).await.unwrap().is_empty());
        assert_eq!(store.path(), path.as_path());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn json_store_corrupt_file_fails_to_open() {
        let path = unique_data_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{not json").unwrap();

        let err = JsonFileStore::open(&path).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Encoding(_)));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn json_store_ignores_leftover_temp_file() {
        let path = unique_data_path();
        let store = JsonFileStore::open(&path).await.unwrap();
        let record = store
            .insert(new_activity(ActivityType::Water, 4.0, at(9)))
            .await
            .unwrap();
        drop(store);

        // An interrupted write leaves a partial temp file behind.
        std::fs::write(path.with_extension("tmp"), b"{\"activities\": [{\"id\"").unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let range = LoggedAtRange { from: at(0), until: None };
        assert_eq!(reopened.select_range(range).await.unwrap(), vec![record]);

        reopened
            .insert(new_activity(ActivityType::Steps, 800.0, at(10)))
            .await
            .unwrap();
        let data = load_data(&path).await.unwrap();
        assert_eq!(data.activities.len(), 2);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn persist_leaves_no_temp_file() {
        let path = unique_data_path();
        let store = JsonFileStore::open(&path).await.unwrap();
        store
            .insert(new_activity(ActivityType::Sleep, 6.0, at(5)))
            .await
            .unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn json_store_rolls_back_failed_write() {
        let path = unique_data_path();
        let store = JsonFileStore::open(&path).await.unwrap();
        // A directory at the data path makes every write fail.
        std::fs::create_dir_all(&path).unwrap();

        let err = store
            .insert(new_activity(ActivityType::Water, 1.0, at(9)))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Io(_)));

        let range = LoggedAtRange { from: at(0), until: None };
        assert!(store.select_range(range).await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
