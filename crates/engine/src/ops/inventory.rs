//! Materials, consumables and equipment.
//!
//! Destroy archives the row; lists and lookups only see active rows. Purge
//! is the rare hard delete and finds archived rows too.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    ConsumableInput, EngineError, EquipmentInput, MaterialInput, Money, Quantity, RecordState,
    ResultEngine, bom_items, consumables, equipment, materials,
};

use super::{Engine, normalize_required_name, normalize_text, with_tx};

/// Generates the list, get and archive operations of an inventory type.
macro_rules! impl_inventory_reads {
    ($entity:ident, $list_fn:ident, $get_fn:ident, $archive_fn:ident, $require_fn:ident) => {
        /// Lists active rows ordered by name.
        pub async fn $list_fn(&self, user_id: &str) -> ResultEngine<Vec<$entity::Model>> {
            with_tx!(self, |db_tx| {
                let shop = self.require_shop(&db_tx, user_id).await?;
                Ok($entity::Entity::find_live(shop.id)
                    .order_by_asc($entity::Column::Name)
                    .all(&db_tx)
                    .await?)
            })
        }

        pub async fn $get_fn(&self, user_id: &str, id: Uuid) -> ResultEngine<$entity::Model> {
            with_tx!(self, |db_tx| {
                let shop = self.require_shop(&db_tx, user_id).await?;
                self.$require_fn(&db_tx, shop.id, id).await
            })
        }

        /// Archives the row instead of deleting it.
        pub async fn $archive_fn(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
            with_tx!(self, |db_tx| {
                let shop = self.require_shop(&db_tx, user_id).await?;
                self.$require_fn(&db_tx, shop.id, id).await?;
                let model = $entity::ActiveModel {
                    id: ActiveValue::Set(id),
                    state: ActiveValue::Set(RecordState::Archived.as_str().to_string()),
                    updated_at: ActiveValue::Set(Utc::now()),
                    ..Default::default()
                };
                model.update(&db_tx).await?;
                Ok(())
            })
        }
    };
}

impl Engine {
    impl_inventory_reads!(
        materials,
        materials,
        material,
        archive_material,
        require_material
    );
    impl_inventory_reads!(
        consumables,
        consumables,
        consumable,
        archive_consumable,
        require_consumable
    );
    impl_inventory_reads!(
        equipment,
        equipment_list,
        equipment,
        archive_equipment,
        require_equipment
    );

    pub async fn create_material(
        &self,
        user_id: &str,
        input: MaterialInput,
    ) -> ResultEngine<materials::Model> {
        let name = normalize_required_name(input.name.as_deref().unwrap_or_default(), "material")?;
        let unit = required_unit(input.unit.as_deref().unwrap_or_default())?;
        let quantity = input.quantity.unwrap_or(Quantity::ZERO).non_negative("quantity")?;
        let cost = input.cost_per_unit.unwrap_or(Money::ZERO).non_negative("cost_per_unit")?;
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let now = Utc::now();
            let model = materials::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                shop_id: ActiveValue::Set(shop.id),
                name: ActiveValue::Set(name),
                category: ActiveValue::Set(normalize_text(input.category.as_deref().unwrap_or_default())),
                unit: ActiveValue::Set(unit),
                quantity_milli: ActiveValue::Set(quantity.minor()),
                cost_per_unit_minor: ActiveValue::Set(cost.minor()),
                supplier_name: ActiveValue::Set(normalize_text(
                    input.supplier_name.as_deref().unwrap_or_default(),
                )),
                notes: ActiveValue::Set(normalize_text(input.notes.as_deref().unwrap_or_default())),
                state: ActiveValue::Set(RecordState::Active.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            Ok(model.insert(&db_tx).await?)
        })
    }

    pub async fn update_material(
        &self,
        user_id: &str,
        id: Uuid,
        input: MaterialInput,
    ) -> ResultEngine<materials::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_material(&db_tx, shop.id, id).await?;
            let mut model: materials::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "material")?);
            }
            if let Some(category) = input.category.as_deref() {
                model.category = ActiveValue::Set(normalize_text(category));
            }
            if let Some(unit) = input.unit.as_deref() {
                model.unit = ActiveValue::Set(required_unit(unit)?);
            }
            if let Some(quantity) = input.quantity {
                model.quantity_milli = ActiveValue::Set(quantity.non_negative("quantity")?.minor());
            }
            if let Some(cost) = input.cost_per_unit {
                model.cost_per_unit_minor =
                    ActiveValue::Set(cost.non_negative("cost_per_unit")?.minor());
            }
            if let Some(supplier) = input.supplier_name.as_deref() {
                model.supplier_name = ActiveValue::Set(normalize_text(supplier));
            }
            if let Some(notes) = input.notes.as_deref() {
                model.notes = ActiveValue::Set(normalize_text(notes));
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            Ok(model.update(&db_tx).await?)
        })
    }

    /// Hard-deletes a material. Fails while any bill of materials uses it.
    pub async fn purge_material(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let material = self.require_material_any(&db_tx, shop.id, id).await?;
            let references = bom_items::Entity::find()
                .filter(bom_items::Column::MaterialId.eq(id))
                .count(&db_tx)
                .await?;
            if references > 0 {
                tracing::warn!(material_id = %id, references, "refusing to purge referenced material");
                return Err(EngineError::InvalidInput(format!(
                    "material '{}' is used by {references} bill of materials item(s)",
                    material.name
                )));
            }
            materials::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn create_consumable(
        &self,
        user_id: &str,
        input: ConsumableInput,
    ) -> ResultEngine<consumables::Model> {
        let name =
            normalize_required_name(input.name.as_deref().unwrap_or_default(), "consumable")?;
        let cost = input.cost_per_unit.unwrap_or(Money::ZERO).non_negative("cost_per_unit")?;
        let quantity = input
            .quantity
            .flatten()
            .map(|q| q.non_negative("quantity"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let now = Utc::now();
            let model = consumables::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                shop_id: ActiveValue::Set(shop.id),
                name: ActiveValue::Set(name),
                unit: ActiveValue::Set(normalize_text(input.unit.as_deref().unwrap_or_default())),
                cost_per_unit_minor: ActiveValue::Set(cost.minor()),
                quantity_milli: ActiveValue::Set(quantity.map(Quantity::minor)),
                notes: ActiveValue::Set(normalize_text(input.notes.as_deref().unwrap_or_default())),
                state: ActiveValue::Set(RecordState::Active.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            Ok(model.insert(&db_tx).await?)
        })
    }

    pub async fn update_consumable(
        &self,
        user_id: &str,
        id: Uuid,
        input: ConsumableInput,
    ) -> ResultEngine<consumables::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_consumable(&db_tx, shop.id, id).await?;
            let mut model: consumables::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "consumable")?);
            }
            if let Some(unit) = input.unit.as_deref() {
                model.unit = ActiveValue::Set(normalize_text(unit));
            }
            if let Some(cost) = input.cost_per_unit {
                model.cost_per_unit_minor =
                    ActiveValue::Set(cost.non_negative("cost_per_unit")?.minor());
            }
            if let Some(quantity) = input.quantity {
                let quantity = quantity.map(|q| q.non_negative("quantity")).transpose()?;
                model.quantity_milli = ActiveValue::Set(quantity.map(Quantity::minor));
            }
            if let Some(notes) = input.notes.as_deref() {
                model.notes = ActiveValue::Set(normalize_text(notes));
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            Ok(model.update(&db_tx).await?)
        })
    }

    pub async fn purge_consumable(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_consumable_any(&db_tx, shop.id, id).await?;
            consumables::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }

    pub async fn create_equipment(
        &self,
        user_id: &str,
        input: EquipmentInput,
    ) -> ResultEngine<equipment::Model> {
        let name = normalize_required_name(input.name.as_deref().unwrap_or_default(), "equipment")?;
        let cost = input
            .purchase_cost
            .flatten()
            .map(|c| c.non_negative("purchase_cost"))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let now = Utc::now();
            let model = equipment::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                shop_id: ActiveValue::Set(shop.id),
                name: ActiveValue::Set(name),
                purchase_date: ActiveValue::Set(input.purchase_date.flatten()),
                purchase_cost_minor: ActiveValue::Set(cost.map(Money::minor)),
                notes: ActiveValue::Set(normalize_text(input.notes.as_deref().unwrap_or_default())),
                state: ActiveValue::Set(RecordState::Active.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            Ok(model.insert(&db_tx).await?)
        })
    }

    pub async fn update_equipment(
        &self,
        user_id: &str,
        id: Uuid,
        input: EquipmentInput,
    ) -> ResultEngine<equipment::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_equipment(&db_tx, shop.id, id).await?;
            let mut model: equipment::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "equipment")?);
            }
            if let Some(date) = input.purchase_date {
                model.purchase_date = ActiveValue::Set(date);
            }
            if let Some(cost) = input.purchase_cost {
                let cost = cost.map(|c| c.non_negative("purchase_cost")).transpose()?;
                model.purchase_cost_minor = ActiveValue::Set(cost.map(Money::minor));
            }
            if let Some(notes) = input.notes.as_deref() {
                model.notes = ActiveValue::Set(normalize_text(notes));
            }
            model.updated_at = ActiveValue::Set(Utc::now());
            Ok(model.update(&db_tx).await?)
        })
    }

    /// Hard-deletes equipment; template links go with it.
    pub async fn purge_equipment(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_equipment_any(&db_tx, shop.id, id).await?;
            equipment::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(())
        })
    }
}

fn required_unit(value: &str) -> ResultEngine<String> {
    let unit = normalize_text(value);
    if unit.is_empty() {
        return Err(EngineError::InvalidInput("unit must not be empty".to_string()));
    }
    Ok(unit)
}
