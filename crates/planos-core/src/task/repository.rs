//! Task collection persisted as one JSON array under the `tasks` key.
//!
//! Every operation is a full load → mutate → save cycle against the store.
//! Nothing is cached between calls, so the repository can never disagree
//! with what a reload would see.

use chrono::{DateTime, Utc};

use super::{Task, TaskDraft, TaskId};
use crate::error::StoreError;
use crate::storage::{read_or_absent, write_or_warn, KeyValueStore, LAST_TASK_ID_KEY, TASKS_KEY};

/// One entry of the persisted array.
///
/// Entries that do not parse as a [`Task`] are invisible to callers but are
/// written back verbatim, so no save ever destroys a record.
#[derive(Debug, Clone)]
enum Record {
    Task(Task),
    Opaque(serde_json::Value),
}

impl Record {
    fn parse(raw: serde_json::Value) -> Self {
        match serde_json::from_value::<Task>(raw.clone()) {
            Ok(task) => Record::Task(task),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed task record");
                Record::Opaque(raw)
            }
        }
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Record::Task(task) => serde_json::to_value(task),
            Record::Opaque(raw) => Ok(raw.clone()),
        }
    }
}

/// Borrowing view over the task records in a store.
pub struct TaskRepository<'a, S: KeyValueStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: KeyValueStore + ?Sized> TaskRepository<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Raw task records. A missing or unparseable blob is an empty list.
    fn load_raw(&self) -> Vec<serde_json::Value> {
        let Some(raw) = read_or_absent(&*self.store, TASKS_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "tasks blob is corrupted, starting from an empty list");
                Vec::new()
            }
        }
    }

    fn load_records(&self) -> Vec<Record> {
        self.load_raw().into_iter().map(Record::parse).collect()
    }

    /// Load all valid tasks in insertion order.
    ///
    /// Records that fail validation are skipped with a warning.
    pub fn list(&self) -> Vec<Task> {
        self.load_records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Task(task) => Some(task),
                Record::Opaque(_) => None,
            })
            .collect()
    }

    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.list().into_iter().find(|t| t.id == id)
    }

    /// Split into (ongoing, finished), each in insertion order.
    pub fn partition(&self) -> (Vec<Task>, Vec<Task>) {
        self.list().into_iter().partition(Task::is_ongoing)
    }

    /// Persist the whole collection in one write.
    ///
    /// `tasks` replaces every valid record: stored tasks missing from it are
    /// removed, new ones are appended. Malformed records keep their place.
    ///
    /// # Errors
    /// Returns the store error when the write does not go through.
    pub fn try_save_all(&mut self, tasks: &[Task]) -> Result<(), StoreError> {
        let mut pending: Vec<Option<&Task>> = tasks.iter().map(Some).collect();
        let mut merged = Vec::with_capacity(tasks.len());
        for record in self.load_records() {
            match record {
                Record::Task(stored) => {
                    let slot = pending
                        .iter_mut()
                        .find(|slot| matches!(slot, Some(t) if t.id == stored.id));
                    if let Some(task) = slot.and_then(|slot| slot.take()) {
                        merged.push(Record::Task(task.clone()));
                    }
                }
                opaque @ Record::Opaque(_) => merged.push(opaque),
            }
        }
        merged.extend(pending.into_iter().flatten().cloned().map(Record::Task));

        let values = merged
            .iter()
            .map(Record::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| write_error(e.to_string()))?;
        let json = serde_json::to_string(&values).map_err(|e| write_error(e.to_string()))?;
        self.store.set(TASKS_KEY, &json)
    }

    /// Like [`Self::try_save_all`], but logs a failed write.
    ///
    /// Returns whether the write reached the store.
    pub fn save_all(&mut self, tasks: &[Task]) -> bool {
        match self.try_save_all(tasks) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist tasks");
                false
            }
        }
    }

    /// Next free id, recomputed from persisted state.
    ///
    /// One past the larger of the highest stored id and the persisted
    /// high-water mark, or `0` for an empty store. Ids of records that are
    /// otherwise malformed still count.
    pub fn next_id(&self) -> TaskId {
        let max_stored = self
            .load_raw()
            .iter()
            .filter_map(|record| record.get("id").and_then(serde_json::Value::as_u64))
            .max();
        match max_stored.max(self.high_water()) {
            Some(last) => last.saturating_add(1),
            None => 0,
        }
    }

    fn high_water(&self) -> Option<TaskId> {
        read_or_absent(&*self.store, LAST_TASK_ID_KEY)
            .and_then(|raw| raw.trim().parse::<TaskId>().ok())
    }

    /// Record `id` as assigned, never lowering the mark.
    fn raise_high_water(&mut self, id: TaskId) {
        if self.high_water().is_some_and(|last| last >= id) {
            return;
        }
        write_or_warn(&mut *self.store, LAST_TASK_ID_KEY, &id.to_string());
    }

    /// Append a new ONGOING task and persist it.
    ///
    /// # Errors
    /// Returns the store error when the task list could not be written; the
    /// task does not exist in that case.
    pub fn create(&mut self, draft: TaskDraft, now: DateTime<Utc>) -> Result<Task, StoreError> {
        let id = self.next_id();
        let mut tasks = self.list();
        let task = Task::new(id, draft, now);
        tasks.push(task.clone());
        self.try_save_all(&tasks)?;
        // The stored max id already covers this task if the mark is lost.
        self.raise_high_water(id);
        tracing::info!(task_id = id, title = %task.title, "task created");
        Ok(task)
    }

    /// Finish a task by id.
    ///
    /// Returns `true` only when the task moved from ONGOING to FINISHED and
    /// that move reached the store. Unknown ids and already-finished tasks
    /// are no-ops and skip the write.
    pub fn finish(&mut self, id: TaskId) -> bool {
        let mut tasks = self.list();
        let transitioned = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .is_some_and(Task::finish);
        if !transitioned || !self.save_all(&tasks) {
            return false;
        }
        tracing::info!(task_id = id, "task finished");
        true
    }

    /// Remove a task permanently. Returns whether the removal was stored.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let mut tasks = self.list();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return false;
        }
        // Stores written before the mark existed would otherwise hand this
        // id out again.
        self.raise_high_water(id);
        if !self.save_all(&tasks) {
            return false;
        }
        tracing::info!(task_id = id, "task deleted");
        true
    }
}

fn write_error(message: String) -> StoreError {
    StoreError::WriteFailed {
        key: TASKS_KEY.to_string(),
        message,
    }
}
