use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

/// Cleaning work queued for a room, created as a check-out side effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousekeepingTask {
    pub id: String,
    pub room_id: String,
    pub status: TaskStatus,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub room_id: String,
    pub note: String,
}

impl NewTask {
    pub(crate) fn into_task(self, id: String) -> HousekeepingTask {
        HousekeepingTask {
            id,
            room_id: self.room_id,
            status: TaskStatus::Pending,
            note: self.note,
            created_at: Utc::now(),
        }
    }
}
