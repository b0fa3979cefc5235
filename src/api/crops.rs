use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, CropDto, validation};
use crate::db::{CropInput, CropPatch};
use crate::entities::crops::CropStatus;
use crate::services::policy::Caller;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCropRequest {
    pub crop_type: String,
    #[serde(default)]
    pub variety: Option<String>,
    pub area: f32,
    #[serde(default)]
    pub location: Option<String>,
    pub planting_date: String,
    pub expected_harvest: String,
    #[serde(default)]
    pub status: Option<CropStatus>,
    #[serde(default)]
    pub health_score: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Honored for admin callers only; everyone else owns what they create.
    #[serde(default)]
    pub owner_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCropRequest {
    #[serde(default)]
    pub crop_type: Option<String>,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub area: Option<f32>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub planting_date: Option<String>,
    #[serde(default)]
    pub expected_harvest: Option<String>,
    #[serde(default)]
    pub status: Option<CropStatus>,
    #[serde(default)]
    pub health_score: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /mycrops
/// Lists crops visible to the caller, newest first. Admins see every crop;
/// farmers see only their own.
pub async fn list_crops(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<ApiResponse<Vec<CropDto>>>, ApiError> {
    let crops = state.store().list_crops(&caller).await?;
    let dtos: Vec<CropDto> = crops.into_iter().map(CropDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /mycrops
/// Creates a crop owned by the caller. Admins may create on behalf of
/// another identity via `owner_id`.
pub async fn create_crop(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Json(payload): Json<CreateCropRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CropDto>>), ApiError> {
    if payload.crop_type.trim().is_empty() {
        return Err(ApiError::validation("Crop type is required"));
    }
    validation::validate_area(payload.area)?;
    validation::validate_date("planting_date", &payload.planting_date)?;
    validation::validate_date("expected_harvest", &payload.expected_harvest)?;
    if let Some(score) = payload.health_score {
        validation::validate_health_score(score)?;
    }

    let owner_id = match payload.owner_id {
        None => caller.id,
        Some(_) if !caller.is_admin() => {
            return Err(ApiError::validation(
                "owner_id may only be set by an admin",
            ));
        }
        Some(owner_id) => {
            if state.store().get_user(owner_id).await?.is_none() {
                return Err(ApiError::not_found("User", owner_id));
            }
            owner_id
        }
    };

    let crop = state
        .store()
        .add_crop(CropInput {
            owner_id,
            crop_type: payload.crop_type.trim().to_string(),
            variety: payload.variety,
            area: payload.area,
            location: payload.location,
            planting_date: payload.planting_date,
            expected_harvest: payload.expected_harvest,
            status: payload.status,
            health_score: payload.health_score,
            notes: payload.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CropDto::from(crop))),
    ))
}

/// GET /mycrops/{id}
pub async fn get_crop(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CropDto>>, ApiError> {
    let crop = state
        .store()
        .get_crop(id)
        .await?
        .ok_or_else(|| ApiError::crop_not_found(id))?;

    caller.assert_owner(crop.owner_id)?;

    Ok(Json(ApiResponse::success(CropDto::from(crop))))
}

/// PUT /mycrops/{id}
/// Partial update; unset fields are untouched and `updated_at` is refreshed.
pub async fn update_crop(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCropRequest>,
) -> Result<Json<ApiResponse<CropDto>>, ApiError> {
    let existing = state
        .store()
        .get_crop(id)
        .await?
        .ok_or_else(|| ApiError::crop_not_found(id))?;

    caller.assert_owner(existing.owner_id)?;

    if let Some(crop_type) = payload.crop_type.as_deref()
        && crop_type.trim().is_empty()
    {
        return Err(ApiError::validation("Crop type cannot be empty"));
    }
    if let Some(area) = payload.area {
        validation::validate_area(area)?;
    }
    if let Some(date) = payload.planting_date.as_deref() {
        validation::validate_date("planting_date", date)?;
    }
    if let Some(date) = payload.expected_harvest.as_deref() {
        validation::validate_date("expected_harvest", date)?;
    }
    if let Some(score) = payload.health_score {
        validation::validate_health_score(score)?;
    }

    let crop = state
        .store()
        .update_crop(
            id,
            CropPatch {
                crop_type: payload.crop_type.map(|s| s.trim().to_string()),
                variety: payload.variety,
                area: payload.area,
                location: payload.location,
                planting_date: payload.planting_date,
                expected_harvest: payload.expected_harvest,
                status: payload.status,
                health_score: payload.health_score,
                notes: payload.notes,
            },
        )
        .await?
        .ok_or_else(|| ApiError::crop_not_found(id))?;

    Ok(Json(ApiResponse::success(CropDto::from(crop))))
}

/// DELETE /mycrops/{id}
/// Deletion is immediate and permanent; a second delete reports not found.
pub async fn delete_crop(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let crop = state
        .store()
        .get_crop(id)
        .await?
        .ok_or_else(|| ApiError::crop_not_found(id))?;

    caller.assert_owner(crop.owner_id)?;

    let deleted = state.store().remove_crop(id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::crop_not_found(id))
    }
}
