pub mod config;
pub mod rewards;
pub mod task;
pub mod tick;

use std::path::Path;

use planos_core::{App, Config, SqliteStore};
use planos_core::error::Result;

use crate::presenter::TerminalPresenter;

pub type CliApp = App<SqliteStore, TerminalPresenter>;

/// Open the store and configuration.
///
/// With `startup`, also runs the first render and the immediate tick, so
/// deadlines that passed since the last invocation are finished before the
/// command itself runs.
pub fn open_app(
    db: Option<&Path>,
    presenter: TerminalPresenter,
    startup: bool,
) -> Result<CliApp> {
    let store = match db {
        Some(path) => SqliteStore::open_at(path)?,
        None => SqliteStore::open()?,
    };
    let mut app = App::new(store, presenter, Config::load_or_default());
    if startup {
        let report = app.startup();
        if report.changed() {
            tracing::info!(finished = report.finished.len(), "caught up on missed deadlines");
        }
    }
    Ok(app)
}
