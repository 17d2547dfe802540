pub mod progress;
pub mod session;
pub mod workout;

pub use progress::{NewProgressLog, ProgressLog};
pub use session::{Credentials, Session, User, UserId};
pub use workout::{PlanExercise, WorkoutPlan};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a stored row.
///
/// The hosted tables may use either `bigint` or `uuid` keys, so both shapes
/// are accepted and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}
