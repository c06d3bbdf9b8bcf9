//! Shared application state for the HTTP server.

use std::path::PathBuf;
use std::sync::Arc;

use qgate::StepRunner;

/// Step runner shared across request handlers.
pub type SharedRunner = Arc<dyn StepRunner + Send + Sync>;

/// Shared state accessible from all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Root directory of the checked project (contains go.mod).
    pub project_dir: PathBuf,
    /// Backend that executes individual checks.
    pub runner: SharedRunner,
}

impl AppState {
    pub fn new(project_dir: PathBuf, runner: SharedRunner) -> Self {
        Self {
            project_dir,
            runner,
        }
    }
}
