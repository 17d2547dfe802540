//! Row access for the workout plan and the progress log.
//!
//! Every operation validates its input before touching the backend and
//! returns `Result<_, AppError>`, so callers get one error shape whether the
//! problem was the input, the backend, or the network.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use crate::backend::{Query, TableStore};
use crate::error::AppError;
use crate::models::{NewProgressLog, ProgressLog, UserId, WorkoutPlan};
use crate::supabase::ApiError;

pub const WORKOUT_PLANS_TABLE: &str = "workout_plans";
pub const PROGRESS_LOGS_TABLE: &str = "progress_logs";

/// Data access adapters over a `TableStore`
#[derive(Clone)]
pub struct DataService {
    store: Arc<dyn TableStore>,
}

impl DataService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    /// The user's workout plan. No plan is `Ok(None)`, not an error.
    pub async fn fetch_workout_plan(&self, user_id: &UserId) -> Result<Option<WorkoutPlan>, AppError> {
        require_user(user_id)?;

        // Ask for two rows so a duplicate plan is detected rather than hidden.
        let query = Query::from(WORKOUT_PLANS_TABLE)
            .eq("user_id", user_id)
            .limit(2);
        let rows = self.store.select(&query).await?;

        match rows.len() {
            0 => {
                tracing::debug!(user = %user_id, "No workout plan found");
                Ok(None)
            }
            1 => {
                let plan = decode_rows::<WorkoutPlan>(rows)?.pop();
                Ok(plan)
            }
            n => Err(AppError::Api(ApiError::InvalidResponse(format!(
                "expected at most one workout plan, found {}",
                n
            )))),
        }
    }

    /// Validate and insert one progress entry, returning it as stored
    pub async fn log_progress(
        &self,
        user_id: &UserId,
        entry: &NewProgressLog,
    ) -> Result<ProgressLog, AppError> {
        require_user(user_id)?;
        let workout_date = entry.validate()?;

        let row = serde_json::to_value(entry.to_insert(user_id, workout_date))?;
        let inserted = self
            .store
            .insert(PROGRESS_LOGS_TABLE, std::slice::from_ref(&row))
            .await?;

        let log = decode_rows::<ProgressLog>(inserted)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Unexpected("insert returned no rows".to_string()))?;

        tracing::info!(
            user = %user_id,
            exercise = %log.exercise_name,
            date = %log.workout_date,
            "Logged progress"
        );
        Ok(log)
    }

    /// All of the user's entries, newest workout date first.
    ///
    /// Entries sharing a date are ordered by creation time, newest first.
    pub async fn fetch_progress_history(&self, user_id: &UserId) -> Result<Vec<ProgressLog>, AppError> {
        require_user(user_id)?;

        let query = Query::from(PROGRESS_LOGS_TABLE)
            .eq("user_id", user_id)
            .order("workout_date", false)
            .order("created_at", false);
        let rows = self.store.select(&query).await?;

        let mut logs = decode_rows::<ProgressLog>(rows)?;
        // The backend already orders; re-sorting keeps the guarantee local.
        logs.sort_by(|a, b| {
            b.workout_date
                .cmp(&a.workout_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        tracing::debug!(user = %user_id, count = logs.len(), "Fetched progress history");
        Ok(logs)
    }
}

fn require_user(user_id: &UserId) -> Result<(), AppError> {
    if user_id.is_blank() {
        return Err(AppError::validation("user id is required"));
    }
    Ok(())
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, AppError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}
