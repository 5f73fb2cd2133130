//! Shop consumables (glue, sandpaper, finish...). Quantity tracking is
//! optional.

use sea_orm::entity::prelude::*;

use crate::record_state::soft_deletable;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "consumables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub unit: String,
    pub cost_per_unit_minor: i64,
    pub quantity_milli: Option<i64>,
    pub notes: String,
    pub state: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shops::Entity",
        from = "Column::ShopId",
        to = "super::shops::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Shop,
}

impl ActiveModelBehavior for ActiveModel {}

soft_deletable!();
