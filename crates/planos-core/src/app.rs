//! Application state and user-facing operations.
//!
//! `App` owns the store, the presenter and the configuration. There is no
//! other mutable state: ids, points, levels and deadlines are all recomputed
//! from the store on every call.

use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::events::{Event, FinishReason};
use crate::presenter::{shown, Presenter};
use crate::reconcile::{reconcile, TickReport};
use crate::rewards::{Achievement, RewardsLedger, RewardsSnapshot};
use crate::storage::{Config, KeyValueStore, RewardsConfig};
use crate::task::{Task, TaskDraft, TaskId, TaskRepository};

pub struct App<S, P> {
    store: S,
    presenter: P,
    config: Config,
}

impl<S: KeyValueStore, P: Presenter> App<S, P> {
    pub fn new(store: S, presenter: P, config: Config) -> Self {
        Self {
            store,
            presenter,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn into_parts(self) -> (S, P) {
        (self.store, self.presenter)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn tasks(&mut self) -> Vec<Task> {
        TaskRepository::new(&mut self.store).list()
    }

    pub fn task(&mut self, id: TaskId) -> Option<Task> {
        TaskRepository::new(&mut self.store).get(id)
    }

    pub fn next_id(&mut self) -> TaskId {
        TaskRepository::new(&mut self.store).next_id()
    }

    pub fn rewards(&mut self) -> RewardsSnapshot {
        RewardsLedger::new(&mut self.store, &self.config.rewards.achievements).snapshot()
    }

    pub fn achievements(&mut self) -> Vec<Achievement> {
        RewardsLedger::new(&mut self.store, &self.config.rewards.achievements).achievements()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// First render plus the immediate tick that catches deadlines which
    /// passed while nothing was running.
    pub fn startup(&mut self) -> TickReport {
        self.startup_at(Utc::now())
    }

    pub fn startup_at(&mut self, now: DateTime<Utc>) -> TickReport {
        let mut events = self.first_render_at(now);
        let mut report = self.reconcile_at(now);
        events.append(&mut report.events);
        report.events = events;
        report
    }

    /// Startup without the tick, for hosts whose tick loop fires
    /// immediately anyway.
    ///
    /// Unlocks achievements already earned, then renders rewards and the
    /// task list.
    pub fn first_render(&mut self) -> Vec<Event> {
        self.first_render_at(Utc::now())
    }

    pub fn first_render_at(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut ledger = RewardsLedger::new(&mut self.store, &self.config.rewards.achievements);
        let unlocked = ledger.evaluate_achievements();
        let snapshot = ledger.snapshot();
        for achievement in &unlocked {
            shown(
                self.presenter.notify_achievement_unlocked(&achievement.name),
                "notify_achievement_unlocked",
            );
        }
        shown(self.presenter.render_rewards(&snapshot), "render_rewards");
        self.render_tasks();

        unlocked
            .into_iter()
            .map(|a| Event::AchievementUnlocked {
                name: a.name,
                level: a.level,
                at: now,
            })
            .collect()
    }

    /// Validate and create a task.
    ///
    /// # Errors
    /// Returns a validation error for an empty title or a negative duration,
    /// and a store error when the task could not be written. Nothing exists
    /// in the store in either case.
    pub fn create_task(
        &mut self,
        title: &str,
        description: Option<&str>,
        duration_minutes: i64,
    ) -> Result<Task, CoreError> {
        self.create_task_at(title, description, duration_minutes, Utc::now())
    }

    pub fn create_task_at(
        &mut self,
        title: &str,
        description: Option<&str>,
        duration_minutes: i64,
        now: DateTime<Utc>,
    ) -> Result<Task, CoreError> {
        let draft = TaskDraft::new(title, description, duration_minutes)?;
        let task = TaskRepository::new(&mut self.store).create(draft, now)?;
        self.render_tasks();
        Ok(task)
    }

    /// Finish a task by hand. Points are awarded only on a real transition.
    ///
    /// Returns the events produced; empty when the task was already
    /// finished, does not exist, or the change could not be stored.
    pub fn finish_task(&mut self, id: TaskId) -> Vec<Event> {
        self.finish_task_at(id, Utc::now())
    }

    pub fn finish_task_at(&mut self, id: TaskId, now: DateTime<Utc>) -> Vec<Event> {
        let mut repo = TaskRepository::new(&mut self.store);
        let Some(task) = repo.get(id) else {
            return Vec::new();
        };
        if !repo.finish(id) {
            return Vec::new();
        }

        let mut events = vec![Event::TaskFinished {
            task_id: id,
            title: task.title,
            reason: FinishReason::Manual,
            at: now,
        }];
        events.extend(award_finished(
            &mut self.store,
            &mut self.presenter,
            &self.config.rewards,
            now,
        ));
        self.render_tasks();
        events
    }

    /// Delete a task permanently. Returns whether it existed and the removal
    /// was stored.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let removed = TaskRepository::new(&mut self.store).delete(id);
        if removed {
            self.render_tasks();
        }
        removed
    }

    /// One reconciliation tick against the current wall clock.
    pub fn reconcile(&mut self) -> TickReport {
        self.reconcile_at(Utc::now())
    }

    pub fn reconcile_at(&mut self, now: DateTime<Utc>) -> TickReport {
        reconcile(
            &mut self.store,
            &mut self.presenter,
            &self.config.rewards,
            now,
        )
    }

    fn render_tasks(&mut self) {
        let (ongoing, finished) = TaskRepository::new(&mut self.store).partition();
        shown(
            self.presenter.render_task_list(&ongoing, &finished),
            "render_task_list",
        );
    }
}

/// Award the per-task points for one ONGOING → FINISHED transition and
/// present the result.
pub(crate) fn award_finished<S, P>(
    store: &mut S,
    presenter: &mut P,
    rewards: &RewardsConfig,
    now: DateTime<Utc>,
) -> Vec<Event>
where
    S: KeyValueStore + ?Sized,
    P: Presenter + ?Sized,
{
    let outcome = RewardsLedger::new(store, &rewards.achievements).award(rewards.points_per_task);
    shown(presenter.render_rewards(&outcome.snapshot), "render_rewards");

    let mut events = vec![Event::PointsAwarded {
        amount: rewards.points_per_task,
        points: outcome.snapshot.points,
        level: outcome.snapshot.level,
        at: now,
    }];
    for achievement in outcome.unlocked {
        shown(
            presenter.notify_achievement_unlocked(&achievement.name),
            "notify_achievement_unlocked",
        );
        events.push(Event::AchievementUnlocked {
            name: achievement.name,
            level: achievement.level,
            at: now,
        });
    }
    events
}
