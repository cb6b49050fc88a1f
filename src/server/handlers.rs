use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use super::state::AppState;
use crate::provider::ProviderDescriptor;

#[derive(Debug, Serialize)]
pub struct ServiceStats {
    pub active_sessions: usize,
    pub providers: Vec<ProviderDescriptor>,
    pub default_provider: String,
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /stats
/// Lightweight service statistics
pub async fn service_stats(State(state): State<AppState>) -> impl IntoResponse {
    let stats = ServiceStats {
        active_sessions: state.active_sessions.load(Ordering::SeqCst),
        providers: state.shared.registry.descriptors(),
        default_provider: state.shared.registry.default_id().to_string(),
    };
    (StatusCode::OK, Json(stats))
}

/// GET /providers/:provider_id/probe
/// Connectivity probe against a provider backend, no session state touched
pub async fn probe_provider(
    State(state): State<AppState>,
    axum::extract::Path(provider_id): axum::extract::Path<String>,
) -> impl IntoResponse {
    let reachable = state.shared.registry.test_connection(&provider_id).await;
    let status = if reachable {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    (
        status,
        Json(serde_json::json!({
            "provider": provider_id,
            "reachable": reachable,
        })),
    )
}
