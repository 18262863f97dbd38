use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::TaskId;

/// How a task reached FINISHED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Finished explicitly by the user.
    Manual,
    /// Deadline passed and a reconciliation tick caught it.
    Expired,
}

/// What a finish or a reconciliation tick changed.
/// The CLI prints them; tests assert on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TaskFinished {
        task_id: TaskId,
        title: String,
        reason: FinishReason,
        at: DateTime<Utc>,
    },
    PointsAwarded {
        amount: u64,
        points: u64,
        level: u64,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        name: String,
        level: u64,
        at: DateTime<Utc>,
    },
}
