//! Tasks with deadlines, difficulty and priority.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CalgridError, CalgridResult};
use crate::model::wire::parse_instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "LOW"),
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub calendar_id: String,
    pub title: String,
    pub description: String,
    /// Estimated minutes of work
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    pub deadline: DateTime<Utc>,
    pub difficulty: u8,
    pub priority: Priority,
    /// Terminal once set; nothing enforces it.
    pub completed: bool,
}

impl Task {
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline < now
    }

    pub fn decode_all(json: &[u8]) -> CalgridResult<Vec<Task>> {
        let payloads: Vec<TaskPayload> = serde_json::from_slice(json)?;
        payloads.into_iter().map(Task::try_from).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPayload {
    pub id: String,
    pub user_id: String,
    pub calendar_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration: Option<f64>,
    pub deadline: String,
    pub difficulty: u8,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl TryFrom<TaskPayload> for Task {
    type Error = CalgridError;

    fn try_from(payload: TaskPayload) -> Result<Self, Self::Error> {
        if payload.id.trim().is_empty() {
            return Err(CalgridError::decode("task", "missing id"));
        }

        let deadline = parse_instant(&payload.deadline).ok_or_else(|| {
            CalgridError::decode(
                "task",
                format!(
                    "task {} has invalid deadline '{}'",
                    payload.id, payload.deadline
                ),
            )
        })?;

        let duration = match payload.duration {
            Some(d) if !d.is_finite() || d < 0.0 => {
                return Err(CalgridError::decode(
                    "task",
                    format!("task {} has invalid duration {}", payload.id, d),
                ));
            }
            Some(d) => Some(d.round() as i64),
            None => None,
        };

        Ok(Task {
            id: payload.id,
            user_id: payload.user_id,
            calendar_id: payload.calendar_id,
            title: payload.title,
            description: payload.description,
            duration,
            deadline,
            difficulty: payload.difficulty,
            priority: payload.priority,
            completed: payload.completed,
        })
    }
}
