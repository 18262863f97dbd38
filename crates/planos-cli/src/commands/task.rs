//! Task management commands for CLI.

use std::path::Path;

use chrono::Utc;
use clap::{Subcommand, ValueEnum};
use planos_core::{Task, TaskStatus, ValidationError};

use super::open_app;
use crate::presenter::TerminalPresenter;

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Ongoing,
    Finished,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Task description
        #[arg(long, short)]
        description: Option<String>,
        /// Countdown hours (negative values count as 0)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        hours: i64,
        /// Countdown minutes (negative values count as 0)
        #[arg(long, default_value = "0", allow_negative_numbers = true)]
        minutes: i64,
        /// Print the created task as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tasks
    List {
        /// Only show tasks with this status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one task
    Show {
        /// Task ID
        id: u64,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Mark a task as finished
    Finish {
        /// Task ID
        id: u64,
        /// Print the resulting events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: u64,
    },
}

/// Total minutes from the hour/minute fields, each clamped at zero.
fn total_minutes(hours: i64, minutes: i64) -> i64 {
    hours.max(0).saturating_mul(60).saturating_add(minutes.max(0))
}

fn json_flag(action: &TaskAction) -> bool {
    match action {
        TaskAction::Add { json, .. }
        | TaskAction::List { json, .. }
        | TaskAction::Show { json, .. }
        | TaskAction::Finish { json, .. } => *json,
        TaskAction::Delete { .. } => false,
    }
}

fn print_task(task: &Task) {
    let now = Utc::now();
    let timer = task
        .remaining_label(now)
        .map(|label| format!("  ({label})"))
        .unwrap_or_default();
    println!("  #{}  {}{}", task.id, task.title, timer);
    if let Some(description) = &task.description {
        println!("       {description}");
    }
}

fn print_section(heading: &str, tasks: &[&Task], empty: &str) {
    println!("{heading}:");
    if tasks.is_empty() {
        println!("  {empty}");
    }
    for task in tasks {
        print_task(task);
    }
}

pub fn run(action: TaskAction, db: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app(db, TerminalPresenter::oneshot(json_flag(&action)), true)?;

    match action {
        TaskAction::Add {
            title,
            description,
            hours,
            minutes,
            json,
        } => {
            let minutes = total_minutes(hours, minutes);
            let task = app.create_task(&title, description.as_deref(), minutes)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                println!("Task created: {}", task.id);
                if task.end_time.is_none() {
                    println!("No timer set; finish it with `planos task finish {}`", task.id);
                }
            }
        }
        TaskAction::List { status, json } => {
            let tasks: Vec<Task> = app
                .tasks()
                .into_iter()
                .filter(|task| match status {
                    Some(StatusFilter::Ongoing) => task.status == TaskStatus::Ongoing,
                    Some(StatusFilter::Finished) => task.status == TaskStatus::Finished,
                    None => true,
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else {
                let (ongoing, finished): (Vec<&Task>, Vec<&Task>) =
                    tasks.iter().partition(|t| t.is_ongoing());
                if !matches!(status, Some(StatusFilter::Finished)) {
                    print_section("Ongoing", &ongoing, "No ongoing tasks yet");
                }
                if !matches!(status, Some(StatusFilter::Ongoing)) {
                    print_section("Finished", &finished, "No finished tasks yet");
                }
            }
        }
        TaskAction::Show { id, json } => {
            let task = app.task(id).ok_or(ValidationError::UnknownTask(id))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                print_task(&task);
            }
        }
        TaskAction::Finish { id, json } => {
            if app.task(id).is_none() {
                return Err(ValidationError::UnknownTask(id).into());
            }
            let events = app.finish_task(id);
            if events.is_empty() && app.task(id).is_some_and(|t| t.is_ongoing()) {
                return Err(format!("could not save task {id}; it is still ongoing").into());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&events)?);
            } else if events.is_empty() {
                println!("Task {id} was already finished");
            } else {
                let rewards = app.rewards();
                println!(
                    "Task {id} finished. Points: {} (level {})",
                    rewards.points, rewards.level
                );
            }
        }
        TaskAction::Delete { id } => {
            if !app.delete_task(id) {
                return Err(ValidationError::UnknownTask(id).into());
            }
            println!("Task {id} deleted");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_minutes_clamps_negative_fields() {
        assert_eq!(total_minutes(1, 30), 90);
        assert_eq!(total_minutes(-2, 15), 15);
        assert_eq!(total_minutes(0, -5), 0);
    }
}
