use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{RecordId, UserId};
use crate::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored progress entry.
///
/// Entries are append-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressLog {
    pub id: RecordId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub workout_name: String,
    pub exercise_name: String,
    pub sets_completed: i32,
    pub reps_achieved: String,
    #[serde(default)]
    pub weight_used: Option<f64>,
    pub workout_date: NaiveDate,
}

/// Progress entry as submitted from the log form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProgressLog {
    pub workout_name: String,
    pub exercise_name: String,
    pub sets_completed: i32,
    pub reps_achieved: String,
    #[serde(default)]
    pub weight_used: Option<f64>,
    pub workout_date: String,
}

/// Row body sent on insert
#[derive(Debug, Serialize)]
pub(crate) struct ProgressInsert<'a> {
    pub user_id: &'a UserId,
    pub workout_name: &'a str,
    pub exercise_name: &'a str,
    pub sets_completed: i32,
    pub reps_achieved: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_used: Option<f64>,
    pub workout_date: NaiveDate,
}

impl NewProgressLog {
    /// Check every required field and return the parsed workout date
    pub fn validate(&self) -> Result<NaiveDate, AppError> {
        if self.workout_name.trim().is_empty() {
            return Err(AppError::validation("workout name is required"));
        }
        if self.exercise_name.trim().is_empty() {
            return Err(AppError::validation("exercise name is required"));
        }
        if self.sets_completed < 0 {
            return Err(AppError::validation("sets completed cannot be negative"));
        }
        if self.reps_achieved.trim().is_empty() {
            return Err(AppError::validation("reps achieved is required"));
        }
        if let Some(weight) = self.weight_used {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AppError::validation("weight used must be a non-negative number"));
            }
        }

        let date = self.workout_date.trim();
        if date.is_empty() {
            return Err(AppError::validation("workout date is required"));
        }
        let invalid = || {
            AppError::validation(format!(
                "workout date '{}' is not a valid YYYY-MM-DD date",
                self.workout_date
            ))
        };
        let parsed = NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|_| invalid())?;

        // The parser also accepts unpadded fields like "2024-5-1".
        if parsed.format(DATE_FORMAT).to_string() != date {
            return Err(invalid());
        }
        Ok(parsed)
    }

    pub(crate) fn to_insert<'a>(
        &'a self,
        user_id: &'a UserId,
        workout_date: NaiveDate,
    ) -> ProgressInsert<'a> {
        ProgressInsert {
            user_id,
            workout_name: &self.workout_name,
            exercise_name: &self.exercise_name,
            sets_completed: self.sets_completed,
            reps_achieved: &self.reps_achieved,
            weight_used: self.weight_used,
            workout_date,
        }
    }
}

impl ProgressLog {
    /// True when this stored entry carries exactly the submitted values
    pub fn matches(&self, entry: &NewProgressLog) -> bool {
        self.workout_name == entry.workout_name
            && self.exercise_name == entry.exercise_name
            && self.sets_completed == entry.sets_completed
            && self.reps_achieved == entry.reps_achieved
            && self.weight_used == entry.weight_used
            && self.workout_date.format(DATE_FORMAT).to_string() == entry.workout_date.trim()
    }
}
