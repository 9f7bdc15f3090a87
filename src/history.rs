use crate::models::ActivityRecord;
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use serde::Serialize;

const DATE_LABEL_FORMAT: &str = "%B %-d, %Y";
const TIME_FORMAT: &str = "%-I:%M %p";

/// Records sharing one local calendar date, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub label: String,
    pub activities: Vec<ActivityRecord>,
}

/// A date group ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryGroup {
    pub date: NaiveDate,
    pub label: String,
    pub heading: String,
    pub count_label: String,
    pub activities: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: ActivityRecord,
    pub time_label: String,
}

impl HistoryGroup {
    /// `now` decides the "Today" heading and the timezone of the time labels.
    pub fn from_group<Tz: TimeZone>(group: DateGroup, now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let tz = now.timezone();
        let today = group
            .activities
            .first()
            .is_some_and(|record| is_today(&record.logged_at, now));
        let heading = if today {
            "Today".to_string()
        } else {
            group.label.clone()
        };
        Self {
            count_label: activity_count_label(group.activities.len()),
            date: group.date,
            label: group.label,
            heading,
            activities: group
                .activities
                .into_iter()
                .map(|record| HistoryEntry {
                    time_label: format_time(&record.logged_at.with_timezone(&tz)),
                    record,
                })
                .collect(),
        }
    }
}

/// "November 3, 2024"
pub fn date_label(date: NaiveDate) -> String {
    date.format(DATE_LABEL_FORMAT).to_string()
}

/// "9:05 AM"
pub fn format_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format(TIME_FORMAT).to_string()
}

pub fn activity_count_label(count: usize) -> String {
    if count == 1 {
        "1 activity".to_string()
    } else {
        format!("{count} activities")
    }
}

/// Buckets records by their calendar date in `tz`.
///
/// Records keep their relative order inside a bucket, and buckets appear in
/// order of first occurrence, so newest-first input gives newest-date-first
/// groups.
pub fn group_by_date<Tz: TimeZone>(records: impl IntoIterator<Item = ActivityRecord>, tz: &Tz) -> Vec<DateGroup> {
    let mut groups: Vec<DateGroup> = Vec::new();
    for record in records {
        let date = record.logged_at.with_timezone(tz).date_naive();
        match groups.iter_mut().find(|group| group.date == date) {
            Some(group) => group.activities.push(record),
            None => groups.push(DateGroup {
                date,
                label: date_label(date),
                activities: vec![record],
            }),
        }
    }
    groups
}

pub fn group_by_local_date(records: impl IntoIterator<Item = ActivityRecord>) -> Vec<DateGroup> {
    group_by_date(records, &Local)
}

/// Same calendar year, month and day as `now`, in `now`'s timezone.
pub fn is_today<Tz: TimeZone, Other: TimeZone>(timestamp: &DateTime<Other>, now: &DateTime<Tz>) -> bool {
    let local = timestamp.with_timezone(&now.timezone());
    local.year() == now.year() && local.month() == now.month() && local.day() == now.day()
}
