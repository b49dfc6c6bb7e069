//! Operational endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// Liveness plus a storage round trip when a database is configured.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage = match &state.db_pool {
        None => "ok",
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!(error = %e, "Health check query failed");
                "unavailable"
            }
        },
    };
    let status = if storage == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(json!({
            "status": if storage == "ok" { "ok" } else { "degraded" },
            "service": state.config.logging.service_name,
            "storage": { "backend": state.registry.backend(), "status": storage },
        })),
    )
}

pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "server": "CDE Registry",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.registry.backend(),
        "moduleSource": state.config.module_source.base_url.is_some(),
        "status": "running"
    }))
}
