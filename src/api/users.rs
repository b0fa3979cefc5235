use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MessageResponse, validation};
use crate::services::auth_service::{Identity, ProfileUpdate};
use crate::services::policy::Caller;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub farm_size: Option<f32>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// GET /users/profile
/// Returns the caller's own identity record
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ApiResponse<Identity>>, ApiError> {
    let identity = state.auth_service().profile(caller.id).await?;

    Ok(Json(ApiResponse::success(identity)))
}

/// PUT /users/profile
/// Partial update of the caller's own identity; unset fields are untouched
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Identity>>, ApiError> {
    let display_name = payload
        .display_name
        .as_deref()
        .map(validation::validate_display_name)
        .transpose()?;

    let farm_size = payload
        .farm_size
        .map(validation::validate_farm_size)
        .transpose()?;

    let identity = state
        .auth_service()
        .update_profile(
            caller.id,
            ProfileUpdate {
                display_name: display_name.map(str::to_string),
                contact: payload.contact,
                farm_size,
            },
        )
        .await?;

    Ok(Json(ApiResponse::success(identity)))
}

/// PUT /users/password
/// Change password (requires current password verification)
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .auth_service()
        .change_password(
            caller.id,
            &payload.current_password,
            &payload.new_password,
        )
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Password updated successfully".to_string(),
    })))
}
