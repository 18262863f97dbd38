use std::path::Path;

use clap::Subcommand;

use super::open_app;
use crate::presenter::TerminalPresenter;

#[derive(Subcommand)]
pub enum RewardsAction {
    /// Show points, level and progress
    Status {
        #[arg(long)]
        json: bool,
    },
    /// List achievements
    Achievements {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: RewardsAction, db: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let json = match action {
        RewardsAction::Status { json } | RewardsAction::Achievements { json } => json,
    };
    let mut app = open_app(db, TerminalPresenter::oneshot(json), true)?;

    match action {
        RewardsAction::Status { json } => {
            let rewards = app.rewards();
            if json {
                println!("{}", serde_json::to_string_pretty(&rewards)?);
            } else {
                println!("Points: {}", rewards.points);
                println!("Level: {}", rewards.level);
                println!("Progress: {:.0}%", rewards.progress_percent);
            }
        }
        RewardsAction::Achievements { json } => {
            let achievements = app.achievements();
            if json {
                println!("{}", serde_json::to_string_pretty(&achievements)?);
            } else {
                for a in &achievements {
                    let mark = if a.unlocked { "x" } else { " " };
                    println!("[{mark}] {} (level {})", a.name, a.level);
                }
            }
        }
    }
    Ok(())
}
