use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// GET /health
/// Liveness probe; requires no authentication.
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}

/// GET /system/status
/// Uptime, version, record counts and a database reachability check.
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let store = state.store();

    let identities = store.count_users().await?;
    let crops = store.count_crops().await?;
    let farmers = store.count_farmers().await?;
    let database_ok = store.ping().await.is_ok();

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        identities,
        crops,
        farmers,
        database_ok,
    })))
}
