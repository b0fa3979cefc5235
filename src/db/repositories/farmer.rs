use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::entities::farmers;
use crate::entities::prelude::*;

/// Repository for the cooperative roster
pub struct FarmerRepository {
    conn: DatabaseConnection,
}

impl FarmerRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_farmer_model(m: farmers::Model) -> Farmer {
        Farmer {
            id: m.id,
            name: m.name,
            email: m.email,
            phone: m.phone,
            location: m.location,
            join_date: m.join_date,
            farm_size: m.farm_size,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    pub async fn list(&self) -> Result<Vec<Farmer>> {
        let rows = Farmers::find()
            .order_by_desc(farmers::Column::CreatedAt)
            .all(&self.conn)
            .await
            .context("Failed to list farmers")?;

        Ok(rows.into_iter().map(Self::map_farmer_model).collect())
    }

    pub async fn get(&self, id: i32) -> Result<Option<Farmer>> {
        let result = Farmers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query farmer")?;
        Ok(result.map(Self::map_farmer_model))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Farmer>> {
        let result = Farmers::find()
            .filter(farmers::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query farmer by email")?;
        Ok(result.map(Self::map_farmer_model))
    }

    pub async fn add(&self, input: FarmerInput) -> Result<Farmer> {
        let now = chrono::Utc::now().to_rfc3339();

        let active = farmers::ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            location: Set(input.location),
            join_date: Set(input.join_date.unwrap_or_else(|| now.clone())),
            farm_size: Set(input.farm_size.unwrap_or(0.0)),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert farmer")?;

        info!("Added farmer to roster: {}", model.email);
        Ok(Self::map_farmer_model(model))
    }

    pub async fn update(&self, id: i32, patch: FarmerPatch) -> Result<Option<Farmer>> {
        let farmer = Farmers::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query farmer for update")?;

        let Some(farmer) = farmer else {
            return Ok(None);
        };

        let mut active: farmers::ActiveModel = farmer.into();
        if let Some(name) = patch.name {
            active.name = Set(name);
        }
        if let Some(email) = patch.email {
            active.email = Set(email);
        }
        if let Some(phone) = patch.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(location) = patch.location {
            active.location = Set(Some(location));
        }
        if let Some(join_date) = patch.join_date {
            active.join_date = Set(join_date);
        }
        if let Some(farm_size) = patch.farm_size {
            active.farm_size = Set(farm_size);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update farmer")?;

        Ok(Some(Self::map_farmer_model(model)))
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Farmers::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete farmer")?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Farmers::find()
            .count(&self.conn)
            .await
            .context("Failed to count farmers")?;
        Ok(count)
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone)]
pub struct Farmer {
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

#[derive(Debug, Clone)]
pub struct FarmerInput {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub join_date: Option<String>,
    pub farm_size: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct FarmerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub join_date: Option<String>,
    pub farm_size: Option<f32>,
}
