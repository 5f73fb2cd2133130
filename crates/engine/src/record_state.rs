//! Soft-delete state shared by inventory items and product templates.
//!
//! Archived rows stay in the database so bills of materials, projects and
//! sales can keep pointing at them, but every list/retrieve query goes
//! through [`soft_deletable!`] helpers that only see `Active` rows.

use serde::{Deserialize, Serialize};

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    #[default]
    Active,
    Archived,
}

impl RecordState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl TryFrom<&str> for RecordState {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            other => Err(EngineError::InvalidInput(format!(
                "invalid record state: {other}"
            ))),
        }
    }
}

/// Generates shop-scoped query helpers for an entity with `shop_id` and
/// `state` columns.
///
/// - `find_live(shop_id)`: active rows of the shop
/// - `find_live_by_id(shop_id, id)`: a single active row of the shop
macro_rules! soft_deletable {
    () => {
        impl Entity {
            pub fn find_live(shop_id: Uuid) -> sea_orm::Select<Entity> {
                Entity::find()
                    .filter(Column::ShopId.eq(shop_id))
                    .filter(Column::State.eq($crate::RecordState::Active.as_str()))
            }

            pub fn find_live_by_id(shop_id: Uuid, id: Uuid) -> sea_orm::Select<Entity> {
                Self::find_live(shop_id).filter(Column::Id.eq(id))
            }
        }

        impl Model {
            pub fn record_state(&self) -> $crate::RecordState {
                $crate::RecordState::try_from(self.state.as_str()).unwrap_or_default()
            }
        }
    };
}

pub(crate) use soft_deletable;
