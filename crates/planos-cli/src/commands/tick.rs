use std::path::Path;
use std::sync::{Arc, Mutex};

use planos_core::ReconcileLoop;

use super::open_app;
use crate::presenter::TerminalPresenter;

/// One tick, without the startup pass, so the report shows exactly what
/// this tick changed.
pub fn run_once(json: bool, db: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app(db, TerminalPresenter::oneshot(json), false)?;
    let report = app.reconcile();
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "finished: {}, skipped (bad end time): {}",
            report.finished.len(),
            report.malformed.len()
        );
    }
    Ok(())
}

/// Reconcile on the configured cadence until Ctrl-C.
///
/// The loop ticks as soon as it starts, so only the first render runs here
/// and that first tick catches up on missed deadlines.
pub fn watch(db: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app(db, TerminalPresenter::live(), false)?;
    app.first_render();
    let app = Arc::new(Mutex::new(app));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let mut ticker = ReconcileLoop::new();
        ticker.start_app(Arc::clone(&app));
        let stopped = tokio::signal::ctrl_c().await;
        ticker.stop();
        stopped
    })?;

    tracing::info!("watch stopped");
    Ok(())
}
