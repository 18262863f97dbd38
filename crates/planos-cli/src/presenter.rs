//! Terminal rendering of engine callbacks.

use std::io::{self, Write};

use planos_core::{PresentError, Presenter, RewardsSnapshot, Task, TimerLabel};

/// Where notifications go. JSON commands keep stdout clean for the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    Stdout,
    Stderr,
}

/// Prints notifications always; lists, rewards and countdowns only when
/// `live` (the `watch` command).
#[derive(Debug, Clone, Copy)]
pub struct TerminalPresenter {
    output: Output,
    live: bool,
}

impl TerminalPresenter {
    pub fn oneshot(json: bool) -> Self {
        Self {
            output: if json { Output::Stderr } else { Output::Stdout },
            live: false,
        }
    }

    pub fn live() -> Self {
        Self {
            output: Output::Stdout,
            live: true,
        }
    }

    fn emit(&self, line: &str) -> Result<(), PresentError> {
        let result = match self.output {
            Output::Stdout => writeln!(io::stdout().lock(), "{line}"),
            Output::Stderr => writeln!(io::stderr().lock(), "{line}"),
        };
        result.map_err(|e| PresentError::new("terminal", e.to_string()))
    }
}

impl Presenter for TerminalPresenter {
    fn render_task_list(
        &mut self,
        ongoing: &[Task],
        finished: &[Task],
    ) -> Result<(), PresentError> {
        if !self.live {
            return Ok(());
        }
        self.emit(&format!(
            "── {} ongoing, {} finished ──",
            ongoing.len(),
            finished.len()
        ))?;
        for task in ongoing {
            self.emit(&format!("  #{} {}", task.id, task.title))?;
        }
        Ok(())
    }

    fn render_rewards(&mut self, rewards: &RewardsSnapshot) -> Result<(), PresentError> {
        if !self.live {
            return Ok(());
        }
        self.emit(&format!(
            "Points: {} | Level {} ({:.0}%)",
            rewards.points, rewards.level, rewards.progress_percent
        ))
    }

    fn render_timer_labels(&mut self, labels: &[TimerLabel]) -> Result<(), PresentError> {
        if !self.live || labels.is_empty() {
            return Ok(());
        }
        let line = labels
            .iter()
            .map(|l| format!("#{} {}", l.task_id, l.label))
            .collect::<Vec<_>>()
            .join(" | ");
        self.emit(&format!("⏱  {line}"))
    }

    fn notify_expired(&mut self, task_title: &str) -> Result<(), PresentError> {
        self.emit(&format!("Time's up for \"{task_title}\"!"))
    }

    fn notify_achievement_unlocked(&mut self, name: &str) -> Result<(), PresentError> {
        self.emit(&format!("Achievement Unlocked: {name}!"))
    }
}
