use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Growth stage of a crop. Progression is planted -> growing -> ready ->
/// harvested by convention; any value can be written via update.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum CropStatus {
    #[sea_orm(string_value = "planted")]
    Planted,
    #[sea_orm(string_value = "growing")]
    Growing,
    #[sea_orm(string_value = "ready")]
    Ready,
    #[sea_orm(string_value = "harvested")]
    Harvested,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "crops")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Owning identity; every crop has exactly one owner.
    pub owner_id: i32,

    pub crop_type: String,

    pub variety: Option<String>,

    /// Planted area in acres.
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
