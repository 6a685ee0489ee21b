use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careerleap-web"
    }))
}

/// GET /health/backend
/// Probes the career-services backend and echoes its health body.
pub async fn backend_health_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, AppError> {
    let backend = state.api.health().await?;
    Ok(Json(json!({
        "status": "ok",
        "backend_url": state.api.base_url(),
        "backend": backend
    })))
}
