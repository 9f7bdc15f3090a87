use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::history::HistoryGroup;
use crate::navigation::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Water,
    Steps,
    Sleep,
}

impl ActivityType {
    pub const ALL: [ActivityType; 3] = [ActivityType::Water, ActivityType::Steps, ActivityType::Sleep];

    pub fn as_str(self) -> &'static str {
        self.profile().key
    }

    pub fn profile(self) -> &'static ActivityProfile {
        match self {
            ActivityType::Water => &PROFILES[0],
            ActivityType::Steps => &PROFILES[1],
            ActivityType::Sleep => &PROFILES[2],
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the service, validation and UI need to know about one activity type.
#[derive(Debug)]
pub struct ActivityProfile {
    pub activity_type: ActivityType,
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub icon: &'static str,
    pub placeholder: &'static str,
    pub default_max: f64,
    /// Over-limit message; `{max}` is replaced with the effective limit.
    pub over_limit: &'static str,
}

impl ActivityProfile {
    pub fn over_limit_message(&self, max: f64) -> String {
        self.over_limit.replace("{max}", &format_quantity(max))
    }
}

pub static PROFILES: [ActivityProfile; 3] = [
    ActivityProfile {
        activity_type: ActivityType::Water,
        key: "water",
        label: "Water Intake",
        unit: "glasses",
        icon: "droplets",
        placeholder: "e.g., 8",
        default_max: 50.0,
        over_limit: "Water intake seems too high (max {max} glasses)",
    },
    ActivityProfile {
        activity_type: ActivityType::Steps,
        key: "steps",
        label: "Steps",
        unit: "steps",
        icon: "footprints",
        placeholder: "e.g., 10000",
        default_max: 100_000.0,
        over_limit: "Steps seem too high (max {max})",
    },
    ActivityProfile {
        activity_type: ActivityType::Sleep,
        key: "sleep",
        label: "Sleep",
        unit: "hours",
        icon: "moon",
        placeholder: "e.g., 7.5",
        default_max: 24.0,
        over_limit: "Sleep hours cannot exceed {max}",
    },
];

/// Whole numbers get thousands separators ("100,000"); fractions print as-is.
pub fn format_quantity(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        let digits = (value.abs() as u64).to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if value < 0.0 {
            grouped.insert(0, '-');
        }
        grouped
    } else {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewActivity {
    pub activity_type: ActivityType,
    pub value: f64,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub activity_type: ActivityType,
    pub value: f64,
    pub logged_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailyStats {
    pub water: f64,
    pub steps: f64,
    pub sleep: f64,
}

impl DailyStats {
    pub fn get(&self, activity_type: ActivityType) -> f64 {
        match activity_type {
            ActivityType::Water => self.water,
            ActivityType::Steps => self.steps,
            ActivityType::Sleep => self.sleep,
        }
    }

    pub fn add(&mut self, activity_type: ActivityType, value: f64) {
        let slot = match activity_type {
            ActivityType::Water => &mut self.water,
            ActivityType::Steps => &mut self.steps,
            ActivityType::Sleep => &mut self.sleep,
        };
        *slot += value;
    }
}

impl<'a> FromIterator<&'a ActivityRecord> for DailyStats {
    fn from_iter<I: IntoIterator<Item = &'a ActivityRecord>>(iter: I) -> Self {
        let mut stats = DailyStats::default();
        for record in iter {
            stats.add(record.activity_type, record.value);
        }
        stats
    }
}

/// Form values arrive either as the raw text field or as a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn into_text(self) -> String {
        match self {
            RawValue::Number(value) => value.to_string(),
            RawValue::Text(text) => text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    pub activity_type: ActivityType,
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateActivityRequest {
    /// The raw field text; an absent or null value is an empty field.
    pub fn value_text(&mut self) -> String {
        self.value.take().map(RawValue::into_text).unwrap_or_default()
    }
}

/// `GET /?screen=history` opens the page on that screen.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    #[serde(default)]
    pub screen: Option<Screen>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: NaiveDate,
    pub date_label: String,
    pub stats: DailyStats,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub groups: Vec<HistoryGroup>,
}

#[derive(Debug, Serialize)]
pub struct ActivityTypeResponse {
    pub activity_type: ActivityType,
    pub label: &'static str,
    pub unit: &'static str,
    pub icon: &'static str,
    pub placeholder: &'static str,
    pub max: f64,
    pub limit_label: String,
    pub limit_message: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorResponse {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}
