//! Recurring tick driver.
//!
//! At most one tick task is alive per [`ReconcileLoop`]: `start` aborts the
//! previous task before spawning the next, so ticks never stack.
//!
//! ```ignore
//! let app = Arc::new(Mutex::new(App::new(store, presenter, config)));
//! let mut ticker = ReconcileLoop::new();
//! ticker.start_app(Arc::clone(&app)); // ticks now, then every interval
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::app::App;
use crate::presenter::Presenter;
use crate::storage::KeyValueStore;

/// Handle to the single recurring reconciliation task.
#[derive(Debug, Default)]
pub struct ReconcileLoop {
    handle: Option<JoinHandle<()>>,
}

impl ReconcileLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_tick` immediately and then every `period`.
    ///
    /// Any previously started tick task is cancelled first. Missed ticks are
    /// skipped rather than replayed: one tick already catches every deadline
    /// in the past.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, period: Duration, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                on_tick();
            }
        });
        self.handle = Some(handle);
        tracing::debug!(?period, "reconcile loop started");
    }

    /// Drive `app.reconcile()` at the app's configured cadence.
    ///
    /// Each tick holds the lock for its whole load → mutate → save cycle.
    pub fn start_app<S, P>(&mut self, app: Arc<Mutex<App<S, P>>>)
    where
        S: KeyValueStore + Send + 'static,
        P: Presenter + Send + 'static,
    {
        let period = app
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .config()
            .reconcile
            .tick_interval();
        self.start(period, move || {
            let mut app = app.lock().unwrap_or_else(PoisonError::into_inner);
            app.reconcile();
        });
    }

    /// Cancel the tick task, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("reconcile loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ReconcileLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
