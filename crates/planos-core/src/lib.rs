//! # Planos Core Library
//!
//! Task/timer lifecycle engine: tasks with an optional countdown move from
//! ongoing to finished either by hand or when a reconciliation tick finds
//! their deadline in the past. Every real transition awards points exactly
//! once, and point totals unlock achievements at level thresholds.
//!
//! ## Architecture
//!
//! - **Storage**: a key-value store of JSON blobs (SQLite or in-memory) plus
//!   TOML configuration
//! - **Tasks**: the Ongoing → Finished state machine and the repository
//!   that persists it
//! - **Reconciliation**: a wall-clock-based scan that the caller (or
//!   [`ReconcileLoop`]) runs periodically
//! - **Rewards**: points, derived levels, achievements
//! - **Presenter**: the rendering/notification seam implemented outside the
//!   core
//!
//! ## Key Components
//!
//! - [`App`]: application state and operations
//! - [`TaskRepository`]: task persistence and id assignment
//! - [`RewardsLedger`]: point accrual and achievement unlocks
//! - [`ReconcileLoop`]: single recurring tick driver

pub mod app;
pub mod error;
pub mod events;
pub mod presenter;
pub mod reconcile;
pub mod rewards;
pub mod storage;
pub mod task;

pub use app::App;
pub use error::{ConfigError, CoreError, PresentError, StoreError, ValidationError};
pub use events::{Event, FinishReason};
pub use presenter::{NullPresenter, Presenter, TimerLabel};
pub use reconcile::{reconcile, ReconcileLoop, TickReport};
pub use rewards::{level, progress_percent, Achievement, RewardsLedger, RewardsSnapshot};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
pub use task::{Deadline, DeadlineStatus, Task, TaskDraft, TaskId, TaskRepository, TaskStatus};
