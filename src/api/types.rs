use serde::{Deserialize, Serialize};

use crate::db::{Crop, Farmer};
use crate::entities::crops::CropStatus;

/// Stable response envelope: `{success, data}` on success and
/// `{success: false, message}` on failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CropDto {
    pub id: i32,
    pub owner_id: i32,
    pub crop_type: String,
    pub variety: Option<String>,
    pub area: f32,
    pub location: Option<String>,
    pub planting_date: String,
    pub expected_harvest: String,
    pub status: CropStatus,
    pub health_score: i32,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Crop> for CropDto {
    fn from(crop: Crop) -> Self {
        Self {
            id: crop.id,
            owner_id: crop.owner_id,
            crop_type: crop.crop_type,
            variety: crop.variety,
            area: crop.area,
            location: crop.location,
            planting_date: crop.planting_date,
            expected_harvest: crop.expected_harvest,
            status: crop.status,
            health_score: crop.health_score,
            notes: crop.notes,
            created_at: crop.created_at,
            updated_at: crop.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FarmerDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub join_date: String,
    pub farm_size: f32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Farmer> for FarmerDto {
    fn from(farmer: Farmer) -> Self {
        Self {
            id: farmer.id,
            name: farmer.name,
            email: farmer.email,
            phone: farmer.phone,
            location: farmer.location,
            join_date: farmer.join_date,
            farm_size: farmer.farm_size,
            created_at: farmer.created_at,
            updated_at: farmer.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub identities: u64,
    pub crops: u64,
    pub farmers: u64,
    pub database_ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
