use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, FarmerDto, validation};
use crate::db::{FarmerInput, FarmerPatch};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateFarmerRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub join_date: Option<String>,
    #[serde(default)]
    pub farm_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateFarmerRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub join_date: Option<String>,
    #[serde(default)]
    pub farm_size: Option<f32>,
}

/// GET /farmers
/// The cooperative roster; readable by any authenticated caller.
pub async fn list_farmers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FarmerDto>>>, ApiError> {
    let farmers = state.store().list_farmers().await?;
    let dtos: Vec<FarmerDto> = farmers.into_iter().map(FarmerDto::from).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /farmers (admin only)
pub async fn create_farmer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateFarmerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<FarmerDto>>), ApiError> {
    let name = validation::validate_display_name(&payload.name)?;
    let email = validation::validate_email(&payload.email)?;
    if let Some(date) = payload.join_date.as_deref() {
        validation::validate_date("join_date", date)?;
    }
    if let Some(farm_size) = payload.farm_size {
        validation::validate_farm_size(farm_size)?;
    }

    if state.store().get_farmer_by_email(email).await?.is_some() {
        return Err(ApiError::conflict("Farmer email already on the roster"));
    }

    let farmer = state
        .store()
        .add_farmer(FarmerInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: payload.phone,
            location: payload.location,
            join_date: payload.join_date,
            farm_size: payload.farm_size,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(FarmerDto::from(farmer))),
    ))
}

/// PUT /farmers/{id} (admin only)
pub async fn update_farmer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateFarmerRequest>,
) -> Result<Json<ApiResponse<FarmerDto>>, ApiError> {
    let name = payload
        .name
        .as_deref()
        .map(validation::validate_display_name)
        .transpose()?;
    let email = payload
        .email
        .as_deref()
        .map(validation::validate_email)
        .transpose()?;
    if let Some(date) = payload.join_date.as_deref() {
        validation::validate_date("join_date", date)?;
    }
    if let Some(farm_size) = payload.farm_size {
        validation::validate_farm_size(farm_size)?;
    }

    if let Some(email) = email
        && let Some(existing) = state.store().get_farmer_by_email(email).await?
        && existing.id != id
    {
        return Err(ApiError::conflict("Farmer email already on the roster"));
    }

    let farmer = state
        .store()
        .update_farmer(
            id,
            FarmerPatch {
                name: name.map(str::to_string),
                email: email.map(str::to_string),
                phone: payload.phone,
                location: payload.location,
                join_date: payload.join_date,
                farm_size: payload.farm_size,
            },
        )
        .await?
        .ok_or_else(|| ApiError::farmer_not_found(id))?;

    Ok(Json(ApiResponse::success(FarmerDto::from(farmer))))
}

/// DELETE /farmers/{id} (admin only)
pub async fn delete_farmer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<bool>>, ApiError> {
    let deleted = state.store().remove_farmer(id).await?;
    if deleted {
        Ok(Json(ApiResponse::success(true)))
    } else {
        Err(ApiError::farmer_not_found(id))
    }
}
