use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set,
};
use tracing::info;

use crate::entities::crops::{self, CropStatus};
use crate::entities::prelude::*;
use crate::services::policy::Caller;

/// Repository for crop records
pub struct CropRepository {
    conn: DatabaseConnection,
}

impl CropRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Model Conversion Helpers
    // ========================================================================

    fn map_crop_model(m: crops::Model) -> Crop {
        Crop {
            id: m.id,
            owner_id: m.owner_id,
            crop_type: m.crop_type,
            variety: m.variety,
            area: m.area,
            location: m.location,
            planting_date: m.planting_date,
            expected_harvest: m.expected_harvest,
            status: m.status,
            health_score: m.health_score,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    // ========================================================================
    // Crop Operations
    // ========================================================================

    /// Lists crops visible to the caller, newest first. The ownership policy
    /// scopes the query: admins get every row, farmers only their own.
    pub async fn list(&self, caller: &Caller) -> Result<Vec<Crop>> {
        let rows = caller
            .scope(Crops::find())
            .order_by_desc(crops::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list crops")?;

        Ok(rows.into_iter().map(Self::map_crop_model).collect())
    }

    pub async fn add(&self, input: CropInput) -> Result<Crop> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = crops::ActiveModel {
            owner_id: Set(input.owner_id),
            crop_type: Set(input.crop_type),
            variety: Set(input.variety),
            area: Set(input.area),
            location: Set(input.location),
            planting_date: Set(input.planting_date),
            expected_harvest: Set(input.expected_harvest),
            status: Set(input.status.unwrap_or(CropStatus::Planted)),
            health_score: Set(input.health_score.unwrap_or(100)),
            notes: Set(input.notes),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert crop")?;

        info!("Added crop {} for owner {}", model.id, model.owner_id);
        Ok(Self::map_crop_model(model))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Crop>> {
        let result = Crops::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query crop")?;
        Ok(result.map(Self::map_crop_model))
    }

    /// Merges the provided fields onto the crop; unset fields are left
    /// untouched. `updated_at` is refreshed on every successful update.
    /// Returns `None` if the crop no longer exists.
    pub async fn update(&self, id: i32, patch: CropPatch) -> Result<Option<Crop>> {
        let crop = Crops::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query crop for update")?;

        let Some(crop) = crop else {
            return Ok(None);
        };

        let mut active: crops::ActiveModel = crop.into();
        if let Some(crop_type) = patch.crop_type {
            active.crop_type = Set(crop_type);
        }
        if let Some(variety) = patch.variety {
            active.variety = Set(Some(variety));
        }
        if let Some(area) = patch.area {
            active.area = Set(area);
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(planting_date) = patch.planting_date {
            active.planting_date = Set(planting_date);
        }
        if let Some(expected_harvest) = patch.expected_harvest {
            active.expected_harvest = Set(expected_harvest);
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(health_score) = patch.health_score {
            active.health_score = Set(health_score);
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update crop")?;

        Ok(Some(Self::map_crop_model(model)))
    }

    /// Deletion is immediate and permanent.
    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Crops::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete crop")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Crops::find()
            .count(&self.conn)
            .await
            .context("Failed to count crops")?;
        Ok(count)
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct Crop {
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

/// Input for creating a crop. Owner is resolved by the caller-facing layer;
/// status and health score fall back to planted/100.
#[derive(Debug, Clone)]
pub struct CropInput {
    pub owner_id: i32,
    pub crop_type: String,
    pub variety: Option<String>,
    pub area: f32,
    pub location: Option<String>,
    pub planting_date: String,
    pub expected_harvest: String,
    pub status: Option<CropStatus>,
    pub health_score: Option<i32>,
    pub notes: Option<String>,
}

/// Partial update; every field optional.
#[derive(Debug, Clone, Default)]
pub struct CropPatch {
    pub crop_type: Option<String>,
    pub variety: Option<String>,
    pub area: Option<f32>,
    pub location: Option<String>,
    pub planting_date: Option<String>,
    pub expected_harvest: Option<String>,
    pub status: Option<CropStatus>,
    pub health_score: Option<i32>,
    pub notes: Option<String>,
}
