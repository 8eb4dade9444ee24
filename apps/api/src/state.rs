use std::sync::Arc;

use crate::config::Config;
use crate::workflow::driver::WorkflowDriver;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the single live workflow record.
    pub workflow: Arc<WorkflowDriver>,
    pub config: Config,
}
