//! Persistent key-value storage.
//!
//! The store is the sole durable source of truth. It holds a handful of
//! JSON or stringified blobs under fixed keys; there are no transactions and
//! the last write wins.

mod config;
pub mod database;
mod memory;

pub use config::{AchievementDef, Config, ReconcileConfig, RewardsConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Key holding the JSON array of task records.
pub const TASKS_KEY: &str = "tasks";
/// Key holding the stringified point total.
pub const POINTS_KEY: &str = "points";
/// Key holding the JSON array of achievements.
pub const ACHIEVEMENTS_KEY: &str = "achievements";
/// Key holding the highest task id ever assigned.
pub const LAST_TASK_ID_KEY: &str = "lastTaskId";

/// Minimal get/set contract over string blobs.
pub trait KeyValueStore {
    /// Read the value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite the value stored under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// Read a key, degrading any storage failure to "absent".
pub(crate) fn read_or_absent<S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "store read failed, treating as absent");
            None
        }
    }
}

/// Write a key, degrading any storage failure to an in-memory-only effect.
///
/// Returns whether the value reached the store.
pub(crate) fn write_or_warn<S: KeyValueStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: &str,
) -> bool {
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "store write failed, change kept in memory only");
            false
        }
    }
}

/// Returns `~/.config/planos[-dev]/` based on PLANOS_ENV.
///
/// Set PLANOS_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the data directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PLANOS_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("planos-dev")
    } else {
        base_dir.join("planos")
    };

    std::fs::create_dir_all(&dir).map_err(|e| StoreError::DataDir(e.to_string()))?;
    Ok(dir)
}
