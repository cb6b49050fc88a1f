use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;
use super::ws;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Per-connection streaming protocol
        .route("/ws", get(ws::ws_handler))
        // Health check
        .route("/health", get(handlers::health_check))
        // Service queries
        .route("/stats", get(handlers::service_stats))
        .route(
            "/providers/:provider_id/probe",
            get(handlers::probe_provider),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
