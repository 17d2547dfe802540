use serde::{Deserialize, Deserializer, Serialize};

use super::{RecordId, UserId};

/// Static workout plan assigned to a user; read-only for this client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<PlanExercise>,
}

/// One line of a plan, kept in plan order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExercise {
    #[serde(alias = "exercise_name")]
    pub name: String,
    pub sets: u32,
    /// Rep scheme such as `"8-12"` or `"5"`
    #[serde(deserialize_with = "rep_scheme")]
    pub reps: String,
}

impl WorkoutPlan {
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

// Plans edited by hand in the dashboard often store plain numbers for reps.
fn rep_scheme<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scheme {
        Text(String),
        Count(u64),
    }

    Ok(match Scheme::deserialize(deserializer)? {
        Scheme::Text(text) => text,
        Scheme::Count(count) => count.to_string(),
    })
}
