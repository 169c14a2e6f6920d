use axum::routing::get;
use axum::Router;

use orchestrator_cell::AppState;

/// Merges the orchestrator cell's §6 surface with a bare liveness route.
/// Every cell owns its own router; this crate only wires them together.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "ED decision-support simulator is running" }))
        .merge(orchestrator_cell::router::create_router(state))
}
