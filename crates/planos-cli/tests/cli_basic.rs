//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary database and
//! HOME directory, so config and data never touch the real user profile.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let db = home.join("planos.db");
    let output = Command::new(env!("CARGO_BIN_EXE_planos"))
        .env("HOME", home)
        .env_remove("PLANOS_ENV")
        .env_remove("XDG_CONFIG_HOME")
        .arg("--db")
        .arg(&db)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(home: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "command {args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

#[test]
fn test_task_add_and_list() {
    let home = TempDir::new().unwrap();
    let created = run_json(
        home.path(),
        &["task", "add", "Write tests", "-d", "for the CLI", "--minutes", "30", "--json"],
    );
    assert_eq!(created["id"], 0);
    assert_eq!(created["status"], "ongoing");
    assert_eq!(created["durationMinutes"], 30);
    assert!(created["endTime"].is_string());

    let listed = run_json(home.path(), &["task", "list", "--json"]);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["title"], "Write tests");
}

#[test]
fn test_task_add_rejects_empty_title() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["task", "add", "   "]);
    assert_ne!(code, 0);
    assert!(stderr.contains("title"));

    let listed = run_json(home.path(), &["task", "list", "--json"]);
    assert!(listed.as_array().unwrap().is_empty());
}

#[test]
fn test_task_finish_awards_once() {
    let home = TempDir::new().unwrap();
    run_json(home.path(), &["task", "add", "Finish me", "--json"]);

    let events = run_json(home.path(), &["task", "finish", "0", "--json"]);
    assert_eq!(events[0]["type"], "task_finished");
    assert_eq!(events[0]["reason"], "manual");

    let again = run_json(home.path(), &["task", "finish", "0", "--json"]);
    assert!(again.as_array().unwrap().is_empty());

    let rewards = run_json(home.path(), &["rewards", "status", "--json"]);
    assert_eq!(rewards["points"], 100);
    assert_eq!(rewards["level"], 2);

    let achievements = run_json(home.path(), &["rewards", "achievements", "--json"]);
    assert_eq!(achievements[0]["unlocked"], true);
}

#[test]
fn test_task_delete_unknown_fails() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["task", "delete", "7"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No task with id 7"));
}

#[test]
fn test_ids_continue_after_delete() {
    let home = TempDir::new().unwrap();
    run_json(home.path(), &["task", "add", "a", "--json"]);
    run_json(home.path(), &["task", "add", "b", "--json"]);
    let (_, _, code) = run_cli(home.path(), &["task", "delete", "1"]);
    assert_eq!(code, 0);

    let created = run_json(home.path(), &["task", "add", "c", "--json"]);
    assert_eq!(created["id"], 2);
}

#[test]
fn test_tick_reports_nothing_on_fresh_store() {
    let home = TempDir::new().unwrap();
    let report = run_json(home.path(), &["tick", "--json"]);
    assert!(report["finished"].as_array().unwrap().is_empty());
    assert_eq!(report["persisted"], false);
}

#[test]
fn test_config_set_and_get() {
    let home = TempDir::new().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "rewards.points_per_task", "15"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "rewards.points_per_task"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "15");

    run_json(home.path(), &["task", "add", "small", "--json"]);
    run_json(home.path(), &["task", "finish", "0", "--json"]);
    let rewards = run_json(home.path(), &["rewards", "status", "--json"]);
    assert_eq!(rewards["points"], 15);
}

#[test]
fn test_config_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "rewards.bogus", "1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("rewards.bogus"));
}
