use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub store: String,
}

impl HealthResponse {
    fn up(store: &str) -> Self {
        Self {
            status: "UP".to_string(),
            store: store.to_string(),
        }
    }

    fn down(store: &str) -> Self {
        Self {
            status: "DOWN".to_string(),
            store: store.to_string(),
        }
    }
}

/// GET /health
/// UP solo si el store responde; un ping exitoso tambien restaura la disponibilidad.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.store().name();

    match state.handler().health_check().await {
        Ok(()) if state.store().is_ready() => (StatusCode::OK, Json(HealthResponse::up(store))),
        Ok(()) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse::down(store)),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::down(store)),
            )
        },
    }
}
