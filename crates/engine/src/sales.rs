//! Closed transactions. Usually created by logging a sale on a project,
//! but a sale may also stand alone.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleChannel {
    Etsy,
    Market,
    Instagram,
    Direct,
    #[default]
    Other,
}

impl SaleChannel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Etsy => "etsy",
            Self::Market => "market",
            Self::Instagram => "instagram",
            Self::Direct => "direct",
            Self::Other => "other",
        }
    }
}

impl TryFrom<&str> for SaleChannel {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "etsy" => Ok(Self::Etsy),
            "market" => Ok(Self::Market),
            "instagram" => Ok(Self::Instagram),
            "direct" => Ok(Self::Direct),
            "other" | "" => Ok(Self::Other),
            other => Err(EngineError::InvalidInput(format!(
                "invalid sale channel: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sales")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub shop_id: Uuid,
    pub project_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub channel: String,
    pub price_minor: i64,
    pub fees_minor: Option<i64>,
    pub currency: String,
    pub sold_at: DateTimeUtc,
    pub notes: String,
    pub cost_of_goods_minor: Option<i64>,
    pub gross_margin_minor: Option<i64>,
    pub platform_fees_minor: Option<i64>,
    pub shipping_cost_minor: Option<i64>,
    pub tax_amount_minor: Option<i64>,
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
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Project,
}

impl Related<super::shops::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shop.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
