//! Sellable product definitions with labor/consumable estimates.
//!
//! `average_*_cost_minor` columns are historical aggregates maintained
//! outside the request path; the API only reads them.

use sea_orm::entity::prelude::*;

use crate::record_state::soft_deletable;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "product_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub workflow_id: Option<Uuid>,
    pub estimated_labor_hours: i64,
    pub hourly_rate_minor: Option<i64>,
    pub estimated_consumables_cost_minor: i64,
    pub average_material_cost_minor: Option<i64>,
    pub average_consumable_cost_minor: Option<i64>,
    pub base_price_minor: Option<i64>,
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
    #[sea_orm(
        belongs_to = "super::workflows::Entity",
        from = "Column::WorkflowId",
        to = "super::workflows::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Workflow,
    #[sea_orm(has_many = "super::bom_items::Entity")]
    BomItems,
    #[sea_orm(has_many = "super::template_equipment::Entity")]
    EquipmentLinks,
}

impl Related<super::bom_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomItems.def()
    }
}

impl Related<super::template_equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EquipmentLinks.def()
    }
}

impl Related<super::equipment::Entity> for Entity {
    fn to() -> RelationDef {
        super::template_equipment::Relation::Equipment.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::template_equipment::Relation::Template.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_deletable!();
