use crate::models::{ActivityType, format_quantity};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Value is required")]
    MissingValue,
    #[error("Value must be a number")]
    NotANumber,
    #[error("Value must be greater than 0")]
    NonPositive,
    #[error("{}", out_of_range_message(.activity_type, .max))]
    OutOfRange { activity_type: ActivityType, max: f64 },
}

fn out_of_range_message(activity_type: &ActivityType, max: &f64) -> String {
    activity_type.profile().over_limit_message(*max)
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingValue => "missing_value",
            ValidationError::NotANumber => "not_a_number",
            ValidationError::NonPositive => "non_positive",
            ValidationError::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Inclusive upper bounds per activity type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActivityLimits {
    pub water: f64,
    pub steps: f64,
    pub sleep: f64,
}

impl Default for ActivityLimits {
    fn default() -> Self {
        Self {
            water: ActivityType::Water.profile().default_max,
            steps: ActivityType::Steps.profile().default_max,
            sleep: ActivityType::Sleep.profile().default_max,
        }
    }
}

impl ActivityLimits {
    pub fn max(&self, activity_type: ActivityType) -> f64 {
        match activity_type {
            ActivityType::Water => self.water,
            ActivityType::Steps => self.steps,
            ActivityType::Sleep => self.sleep,
        }
    }

    pub fn with_max(mut self, activity_type: ActivityType, max: f64) -> Self {
        match activity_type {
            ActivityType::Water => self.water = max,
            ActivityType::Steps => self.steps = max,
            ActivityType::Sleep => self.sleep = max,
        }
        self
    }
}

/// Checks a raw form value. Rules run in order and the first failure wins.
pub fn validate(
    activity_type: ActivityType,
    raw_value: &str,
    limits: &ActivityLimits,
) -> Result<f64, ValidationError> {
    let trimmed = raw_value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingValue);
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|_| ValidationError::NotANumber)?;
    if value.is_nan() {
        return Err(ValidationError::NotANumber);
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositive);
    }

    let max = limits.max(activity_type);
    if value > max {
        return Err(ValidationError::OutOfRange { activity_type, max });
    }

    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub activity_type: ActivityType,
    pub value: f64,
    pub notes: Option<String>,
}

/// Candidate entry on the log screen.
#[derive(Debug, Clone)]
pub struct ActivityForm {
    limits: ActivityLimits,
    activity_type: ActivityType,
    value: String,
    notes: String,
    error: Option<ValidationError>,
}

impl ActivityForm {
    pub fn new(limits: ActivityLimits) -> Self {
        Self {
            limits,
            activity_type: ActivityType::Water,
            value: String::new(),
            notes: String::new(),
            error: None,
        }
    }

    pub fn activity_type(&self) -> ActivityType {
        self.activity_type
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Switching to another type discards the typed value and any error.
    pub fn select_type(&mut self, activity_type: ActivityType) {
        if self.activity_type == activity_type {
            return;
        }
        self.activity_type = activity_type;
        self.value.clear();
        self.error = None;
    }

    pub fn set_value(&mut self, raw_value: impl Into<String>) {
        self.value = raw_value.into();
        self.error = validate(self.activity_type, &self.value, &self.limits).err();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn reset(&mut self) {
        self.value.clear();
        self.notes.clear();
        self.error = None;
    }

    pub fn submit(&mut self) -> Result<Submission, ValidationError> {
        match validate(self.activity_type, &self.value, &self.limits) {
            Ok(value) => {
                self.error = None;
                let notes = self.notes.trim();
                Ok(Submission {
                    activity_type: self.activity_type,
                    value,
                    notes: (!notes.is_empty()).then(|| notes.to_string()),
                })
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }
}

/// Upper-bound text for the type table, e.g. "max 100,000 steps".
pub fn describe_limit(activity_type: ActivityType, limits: &ActivityLimits) -> String {
    format!(
        "max {} {}",
        format_quantity(limits.max(activity_type)),
        activity_type.profile().unit
    )
}
