//! Presentation adapter seam.
//!
//! The engine calls into a [`Presenter`] after mutations and on every tick.
//! Presenter failures are logged and otherwise ignored: a notification that
//! cannot be shown never changes what was persisted.

use serde::Serialize;

use crate::error::PresentError;
use crate::rewards::RewardsSnapshot;
use crate::task::{Task, TaskId};

/// Countdown text for one ongoing timed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerLabel {
    pub task_id: TaskId,
    pub label: String,
}

/// Rendering and notification sink implemented outside the core.
pub trait Presenter {
    /// Full refresh of both task lists. Called after any task mutation.
    fn render_task_list(&mut self, ongoing: &[Task], finished: &[Task]) -> Result<(), PresentError>;

    /// Called after any award and at startup.
    fn render_rewards(&mut self, rewards: &RewardsSnapshot) -> Result<(), PresentError>;

    /// Cheap refresh of countdown labels on ticks that changed nothing.
    fn render_timer_labels(&mut self, _labels: &[TimerLabel]) -> Result<(), PresentError> {
        Ok(())
    }

    /// Once per task whose deadline passed.
    fn notify_expired(&mut self, task_title: &str) -> Result<(), PresentError>;

    /// Once per achievement unlock.
    fn notify_achievement_unlocked(&mut self, name: &str) -> Result<(), PresentError>;
}

/// Presenter that renders nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render_task_list(&mut self, _: &[Task], _: &[Task]) -> Result<(), PresentError> {
        Ok(())
    }

    fn render_rewards(&mut self, _: &RewardsSnapshot) -> Result<(), PresentError> {
        Ok(())
    }

    fn notify_expired(&mut self, _: &str) -> Result<(), PresentError> {
        Ok(())
    }

    fn notify_achievement_unlocked(&mut self, _: &str) -> Result<(), PresentError> {
        Ok(())
    }
}

/// Log and swallow a presenter failure.
pub(crate) fn shown(result: Result<(), PresentError>, what: &str) {
    if let Err(e) = result {
        tracing::warn!(what, error = %e, "presenter call failed, state unaffected");
    }
}
