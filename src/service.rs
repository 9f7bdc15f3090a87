use crate::clock::{Clock, start_of_day};
use crate::history::{HistoryGroup, group_by_local_date};
use crate::models::{ActivityRecord, ActivityType, DailyStats, NewActivity};
use crate::storage::{ActivityStore, LoggedAtRange, PersistenceError};
use chrono::{DateTime, Duration, Local, Utc};
use std::sync::Arc;
use tracing::{debug, info};

const HISTORY_DAYS: i64 = 7;

#[derive(Clone)]
pub struct ActivityService {
    store: Arc<dyn ActivityStore>,
    clock: Arc<dyn Clock>,
}

impl ActivityService {
    pub fn new(store: Arc<dyn ActivityStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub async fn log_activity(
        &self,
        activity_type: ActivityType,
        value: f64,
        notes: Option<&str>,
    ) -> Result<ActivityRecord, PersistenceError> {
        let notes = notes.map(str::trim).filter(|notes| !notes.is_empty());
        let activity = NewActivity {
            activity_type,
            value,
            notes: notes.map(str::to_string),
            logged_at: self.clock.now().with_timezone(&Utc),
        };

        let record = self.store.insert(activity).await?;
        info!(id = %record.id, activity_type = %record.activity_type, value = record.value, "logged activity");
        Ok(record)
    }

    /// Per-type totals for [local midnight today, local midnight tomorrow).
    pub async fn today_stats(&self) -> Result<DailyStats, PersistenceError> {
        let today = self.clock.now().date_naive();
        let range = LoggedAtRange {
            from: start_of_day(today).with_timezone(&Utc),
            until: Some(start_of_day(today + Duration::days(1)).with_timezone(&Utc)),
        };

        let records = self.store.select_range(range).await?;
        debug!(records = records.len(), "computed today stats");
        Ok(records.iter().collect())
    }

    /// Everything logged since local midnight seven days ago, newest first.
    pub async fn activities_last_seven_days(&self) -> Result<Vec<ActivityRecord>, PersistenceError> {
        let first_day = self.clock.now().date_naive() - Duration::days(HISTORY_DAYS);
        let range = LoggedAtRange {
            from: start_of_day(first_day).with_timezone(&Utc),
            until: None,
        };
        self.store.select_range(range).await
    }

    pub async fn history(&self) -> Result<Vec<HistoryGroup>, PersistenceError> {
        let now = self.clock.now();
        let records = self.activities_last_seven_days().await?;
        Ok(group_by_local_date(records)
            .into_iter()
            .map(|group| HistoryGroup::from_group(group, &now))
            .collect())
    }
}
