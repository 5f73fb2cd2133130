use sea_orm::entity::prelude::*;

use crate::record_state::soft_deletable;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "equipment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub name: String,
    pub purchase_date: Option<Date>,
    pub purchase_cost_minor: Option<i64>,
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
    #[sea_orm(has_many = "super::template_equipment::Entity")]
    TemplateLinks,
}

impl Related<super::template_equipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TemplateLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

soft_deletable!();
