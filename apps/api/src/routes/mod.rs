pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::workflow::handlers;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Workflow API
        .route("/api/v1/workflow", get(handlers::handle_get_workflow))
        .route("/api/v1/workflow/run", post(handlers::handle_run))
        .route("/api/v1/workflow/result", get(handlers::handle_get_result))
        .route("/api/v1/workflow/reset", post(handlers::handle_reset))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
