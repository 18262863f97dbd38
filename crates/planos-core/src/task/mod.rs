//! Task entity and its Ongoing → Finished state machine.
//!
//! ```text
//!   create ──> ONGOING ──(finish | deadline passed)──> FINISHED ──> (delete)
//! ```
//!
//! FINISHED is terminal: a finished task is never re-opened. `end_time` is
//! present only while a timed task is ONGOING and is cleared by every path
//! into FINISHED.

mod repository;

pub use repository::TaskRepository;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Task identifier. Assigned from persisted state, never reused.
pub type TaskId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Ongoing,
    Finished,
}

/// Persisted deadline of a timed task.
///
/// Records written by hand or by older builds may carry a deadline that does
/// not parse. Those are kept verbatim so a save does not destroy them, and
/// the task is treated as never expiring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Deadline {
    At(#[serde(with = "iso8601")] DateTime<Utc>),
    Malformed(serde_json::Value),
}

impl Deadline {
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Deadline::At(at) => Some(*at),
            Deadline::Malformed(_) => None,
        }
    }
}

/// Where a task stands relative to its deadline at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineStatus {
    /// Finished, or created without a timer.
    NoTimer,
    /// Deadline still ahead by the given amount.
    Pending(Duration),
    /// Deadline reached or passed.
    Expired,
    /// Deadline present but unparseable.
    Malformed,
}

/// One user-tracked unit of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Length as entered, kept exactly as stored. The deadline lives in
    /// `end_time`; this field is informational.
    #[serde(default = "no_duration")]
    pub duration_minutes: serde_json::Number,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<Deadline>,
}

fn no_duration() -> serde_json::Number {
    serde_json::Number::from(0u32)
}

/// Validated input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: u32,
}

impl TaskDraft {
    /// Validate raw user input.
    ///
    /// Title and description are trimmed; an empty description becomes
    /// `None`.
    ///
    /// # Errors
    /// Rejects an empty title and a negative or oversized duration.
    pub fn new(
        title: &str,
        description: Option<&str>,
        duration_minutes: i64,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if duration_minutes < 0 {
            return Err(ValidationError::NegativeDuration(duration_minutes));
        }
        let duration_minutes = u32::try_from(duration_minutes)
            .map_err(|_| ValidationError::DurationTooLong(duration_minutes))?;
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(Self {
            title: title.to_string(),
            description,
            duration_minutes,
        })
    }
}

impl Task {
    /// Build an ONGOING task from a validated draft.
    pub fn new(id: TaskId, draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let end_time = (draft.duration_minutes > 0)
            .then(|| Deadline::At(now + Duration::minutes(i64::from(draft.duration_minutes))));
        Self {
            id,
            title: draft.title,
            description: draft.description,
            status: TaskStatus::Ongoing,
            duration_minutes: serde_json::Number::from(draft.duration_minutes),
            created_at: now,
            end_time,
        }
    }

    pub fn is_ongoing(&self) -> bool {
        self.status == TaskStatus::Ongoing
    }

    /// Move to FINISHED and clear the deadline.
    ///
    /// Returns `true` only when a transition actually happened; finishing a
    /// finished task is a no-op.
    pub fn finish(&mut self) -> bool {
        if self.status == TaskStatus::Finished {
            return false;
        }
        self.status = TaskStatus::Finished;
        self.end_time = None;
        true
    }

    pub fn deadline_status(&self, now: DateTime<Utc>) -> DeadlineStatus {
        if !self.is_ongoing() {
            return DeadlineStatus::NoTimer;
        }
        match &self.end_time {
            None => DeadlineStatus::NoTimer,
            Some(Deadline::Malformed(_)) => DeadlineStatus::Malformed,
            Some(Deadline::At(end)) if *end <= now => DeadlineStatus::Expired,
            Some(Deadline::At(end)) => DeadlineStatus::Pending(*end - now),
        }
    }

    /// Countdown label for an ongoing timed task, `None` when it has no timer.
    pub fn remaining_label(&self, now: DateTime<Utc>) -> Option<String> {
        match self.deadline_status(now) {
            DeadlineStatus::NoTimer => None,
            DeadlineStatus::Pending(left) => Some(format_remaining(left)),
            DeadlineStatus::Expired => Some("Time expired!".to_string()),
            DeadlineStatus::Malformed => Some("—".to_string()),
        }
    }
}

/// `1h 2m 3s`, `2m 3s` or `3s`.
pub fn format_remaining(left: Duration) -> String {
    let secs = left.num_seconds().max(0);
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
pub(crate) mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
