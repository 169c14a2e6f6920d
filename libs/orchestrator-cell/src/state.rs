use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use shared_config::AppConfig;

use crate::cycle::RunOutcome;

/// Shared axum state (spec.md §5: "External callers... MUST treat a
/// simulator run as exclusive: start -> await completion -> read outputs").
/// The config is immutable for the server's lifetime; the last run's
/// outcome is the only mutable piece, guarded so two requests can never
/// drive overlapping runs.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub log_dir: PathBuf,
    pub last_run: Arc<Mutex<Option<RunOutcome>>>,
}

impl AppState {
    pub fn new(config: AppConfig, log_dir: PathBuf) -> Self {
        Self { config: Arc::new(config), log_dir, last_run: Arc::new(Mutex::new(None)) }
    }
}
