//! Periodic expiry reconciliation.
//!
//! Detection is pull-based: each tick re-reads every deadline from the store
//! and compares it with the wall clock. A host that slept through several
//! deadlines finishes all of them on the first tick after waking.
//!
//! A tick either:
//! - finishes at least one task, persists the batch once, refreshes the task
//!   list, and awards + notifies once per finished task; or
//! - finishes nothing, skips the write, and only refreshes countdown labels.
//!
//! Awards and notifications follow the stored transition, not the in-memory
//! one. If the batch write fails the tasks are still ONGOING in the store,
//! so the tick reports nothing else and the next tick tries again.

mod driver;

pub use driver::ReconcileLoop;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::app::award_finished;
use crate::events::{Event, FinishReason};
use crate::presenter::{shown, Presenter, TimerLabel};
use crate::storage::{KeyValueStore, RewardsConfig};
use crate::task::{DeadlineStatus, Task, TaskId, TaskRepository};

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// Tasks whose deadline had passed and that this tick moved to FINISHED.
    /// Only stored when `persisted` is true.
    pub finished: Vec<TaskId>,
    /// Ongoing tasks skipped because their deadline does not parse.
    pub malformed: Vec<TaskId>,
    /// Whether the batch write reached the store. `false` when nothing
    /// changed or the write failed.
    pub persisted: bool,
    /// Empty unless the batch was persisted.
    pub events: Vec<Event>,
}

impl TickReport {
    pub fn changed(&self) -> bool {
        !self.finished.is_empty()
    }
}

/// Run one reconciliation tick against `now`.
pub fn reconcile<S, P>(
    store: &mut S,
    presenter: &mut P,
    rewards: &RewardsConfig,
    now: DateTime<Utc>,
) -> TickReport
where
    S: KeyValueStore + ?Sized,
    P: Presenter + ?Sized,
{
    let mut repo = TaskRepository::new(&mut *store);
    let mut tasks = repo.list();
    let mut report = TickReport::default();
    let mut expired_titles = Vec::new();

    for task in tasks.iter_mut() {
        match task.deadline_status(now) {
            DeadlineStatus::Expired => {
                if task.finish() {
                    tracing::info!(task_id = task.id, title = %task.title, "task expired");
                    report.finished.push(task.id);
                    expired_titles.push(task.title.clone());
                    report.events.push(Event::TaskFinished {
                        task_id: task.id,
                        title: task.title.clone(),
                        reason: FinishReason::Expired,
                        at: now,
                    });
                }
            }
            DeadlineStatus::Malformed => {
                tracing::warn!(task_id = task.id, "skipping task with unparseable end time");
                report.malformed.push(task.id);
            }
            DeadlineStatus::NoTimer | DeadlineStatus::Pending(_) => {}
        }
    }

    if !report.changed() {
        let labels: Vec<TimerLabel> = tasks
            .iter()
            .filter_map(|t| {
                t.remaining_label(now).map(|label| TimerLabel {
                    task_id: t.id,
                    label,
                })
            })
            .collect();
        shown(presenter.render_timer_labels(&labels), "render_timer_labels");
        tracing::debug!(tasks = tasks.len(), "tick: nothing expired");
        return report;
    }

    report.persisted = repo.save_all(&tasks);
    if !report.persisted {
        tracing::warn!(tasks = ?report.finished, "expiry not stored, retrying on the next tick");
        report.events.clear();
        return report;
    }

    let (ongoing, finished): (Vec<Task>, Vec<Task>) =
        tasks.into_iter().partition(Task::is_ongoing);
    shown(presenter.render_task_list(&ongoing, &finished), "render_task_list");

    for title in &expired_titles {
        let award_events = award_finished(&mut *store, &mut *presenter, rewards, now);
        report.events.extend(award_events);
        shown(presenter.notify_expired(title), "notify_expired");
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Duration;

    use crate::presenter::NullPresenter;
    use crate::storage::{MemoryStore, POINTS_KEY, TASKS_KEY};
    use crate::task::{TaskDraft, TaskStatus};

    fn seed(store: &mut MemoryStore, minutes: i64, created: DateTime<Utc>) -> Task {
        TaskRepository::new(store)
            .create(TaskDraft::new("t", None, minutes).unwrap(), created)
            .unwrap()
    }

    #[test]
    fn finishes_only_past_deadlines() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        let past = seed(&mut store, 5, now - Duration::minutes(10));
        let future = seed(&mut store, 60, now);

        let report = reconcile(&mut store, &mut NullPresenter, &RewardsConfig::default(), now);
        assert_eq!(report.finished, vec![past.id]);
        assert!(report.persisted);

        let repo = TaskRepository::new(&mut store);
        assert_eq!(repo.get(past.id).unwrap().status, TaskStatus::Finished);
        assert_eq!(repo.get(future.id).unwrap().status, TaskStatus::Ongoing);
    }

    #[test]
    fn quiet_tick_skips_the_write() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        seed(&mut store, 60, now);
        let before = store.get(TASKS_KEY).unwrap();

        let report = reconcile(&mut store, &mut NullPresenter, &RewardsConfig::default(), now);
        assert!(!report.changed());
        assert!(!report.persisted);
        assert_eq!(store.get(TASKS_KEY).unwrap(), before);
        assert!(store.get(POINTS_KEY).unwrap().is_none());
    }

    #[test]
    fn second_tick_awards_nothing() {
        let mut store = MemoryStore::new();
        let now = Utc::now();
        seed(&mut store, 1, now - Duration::minutes(5));
        let rewards = RewardsConfig::default();

        assert_eq!(reconcile(&mut store, &mut NullPresenter, &rewards, now).finished.len(), 1);
        assert!(reconcile(&mut store, &mut NullPresenter, &rewards, now).finished.is_empty());
        assert_eq!(store.get(POINTS_KEY).unwrap().as_deref(), Some("100"));
    }

    #[test]
    fn unparseable_records_survive_an_expiry_tick() {
        let mut store = MemoryStore::new();
        store
            .set(
                TASKS_KEY,
                r#"[{"id":0,"title":"due","status":"ongoing","durationMinutes":1,
                     "createdAt":"2025-01-01T00:00:00.000Z","endTime":"2025-01-01T00:01:00.000Z"},
                    {"id":5,"title":"kept","status":"ongoing","durationMinutes":"soon",
                     "createdAt":"2025-01-01T00:00:00.000Z"}]"#,
            )
            .unwrap();
        assert_eq!(TaskRepository::new(&mut store).next_id(), 6);

        let rewards = RewardsConfig::default();
        let report = reconcile(&mut store, &mut NullPresenter, &rewards, Utc::now());
        assert_eq!(report.finished, vec![0]);

        let raw = store.get(TASKS_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""title":"kept""#));
        assert_eq!(TaskRepository::new(&mut store).next_id(), 6);
    }
}
