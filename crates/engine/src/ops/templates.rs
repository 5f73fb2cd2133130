//! Product templates with their bill of materials and equipment links.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    BomItemInput, EngineError, Money, RecordState, ResultEngine, TemplateInput, bom_items,
    materials, product_templates, template_equipment,
};

use super::{Engine, normalize_required_name, normalize_text, with_tx};

/// A BOM line with the name of its material.
#[derive(Clone, Debug)]
pub struct BomLine {
    pub item: bom_items::Model,
    pub material_name: String,
}

#[derive(Clone, Debug)]
pub struct TemplateDetail {
    pub template: product_templates::Model,
    pub bom: Vec<BomLine>,
    pub equipment_ids: Vec<Uuid>,
}

impl Engine {
    /// Lists active templates ordered by name.
    pub async fn templates(&self, user_id: &str) -> ResultEngine<Vec<TemplateDetail>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let rows = product_templates::Entity::find_live(shop.id)
                .order_by_asc(product_templates::Column::Name)
                .all(&db_tx)
                .await?;
            self.template_details(&db_tx, rows).await
        })
    }

    pub async fn template(&self, user_id: &str, id: Uuid) -> ResultEngine<TemplateDetail> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let model = self.require_template(&db_tx, shop.id, id).await?;
            self.template_detail(&db_tx, model).await
        })
    }

    pub async fn create_template(
        &self,
        user_id: &str,
        input: TemplateInput,
    ) -> ResultEngine<TemplateDetail> {
        let name =
            normalize_required_name(input.name.as_deref().unwrap_or_default(), "product template")?;
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let now = Utc::now();
            let id = Uuid::new_v4();
            let model = product_templates::ActiveModel {
                id: ActiveValue::Set(id),
                shop_id: ActiveValue::Set(shop.id),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(String::new()),
                category: ActiveValue::Set(String::new()),
                workflow_id: ActiveValue::Set(None),
                estimated_labor_hours: ActiveValue::Set(0),
                hourly_rate_minor: ActiveValue::Set(None),
                estimated_consumables_cost_minor: ActiveValue::Set(0),
                average_material_cost_minor: ActiveValue::Set(None),
                average_consumable_cost_minor: ActiveValue::Set(None),
                base_price_minor: ActiveValue::Set(None),
                state: ActiveValue::Set(RecordState::Active.as_str().to_string()),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = self.apply_template_input(&db_tx, shop.id, model, &input).await?;
            let template = model.insert(&db_tx).await?;

            if let Some(bom) = input.bom.as_deref() {
                self.replace_bom(&db_tx, shop.id, id, bom).await?;
            }
            if let Some(equipment_ids) = input.equipment_ids.as_deref() {
                self.replace_equipment_links(&db_tx, shop.id, id, equipment_ids)
                    .await?;
            }
            self.template_detail(&db_tx, template).await
        })
    }

    /// Updates a template. A supplied BOM or equipment list replaces the
    /// current one wholesale.
    pub async fn update_template(
        &self,
        user_id: &str,
        id: Uuid,
        input: TemplateInput,
    ) -> ResultEngine<TemplateDetail> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_template(&db_tx, shop.id, id).await?;
            let mut model: product_templates::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "product template")?);
            }
            let mut model = self.apply_template_input(&db_tx, shop.id, model, &input).await?;
            model.updated_at = ActiveValue::Set(Utc::now());
            let template = model.update(&db_tx).await?;

            if let Some(bom) = input.bom.as_deref() {
                self.replace_bom(&db_tx, shop.id, id, bom).await?;
            }
            if let Some(equipment_ids) = input.equipment_ids.as_deref() {
                self.replace_equipment_links(&db_tx, shop.id, id, equipment_ids)
                    .await?;
            }
            self.template_detail(&db_tx, template).await
        })
    }

    /// Archives a template. Projects and sales keep pointing at it.
    pub async fn archive_template(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_template(&db_tx, shop.id, id).await?;
            let model = product_templates::ActiveModel {
                id: ActiveValue::Set(id),
                state: ActiveValue::Set(RecordState::Archived.as_str().to_string()),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn apply_template_input(
        &self,
        db: &DatabaseTransaction,
        shop_id: Uuid,
        mut model: product_templates::ActiveModel,
        input: &TemplateInput,
    ) -> ResultEngine<product_templates::ActiveModel> {
        if let Some(description) = input.description.as_deref() {
            model.description = ActiveValue::Set(normalize_text(description));
        }
        if let Some(category) = input.category.as_deref() {
            model.category = ActiveValue::Set(normalize_text(category));
        }
        if let Some(workflow_id) = input.workflow_id {
            if let Some(workflow_id) = workflow_id {
                self.require_workflow(db, shop_id, workflow_id).await?;
            }
            model.workflow_id = ActiveValue::Set(workflow_id);
        }
        if let Some(hours) = input.estimated_labor_hours {
            model.estimated_labor_hours =
                ActiveValue::Set(hours.non_negative("estimated_labor_hours")?.minor());
        }
        if let Some(rate) = input.hourly_rate {
            let rate = rate.map(|r| r.non_negative("hourly_rate")).transpose()?;
            model.hourly_rate_minor = ActiveValue::Set(rate.map(Money::minor));
        }
        if let Some(cost) = input.estimated_consumables_cost {
            model.estimated_consumables_cost_minor =
                ActiveValue::Set(cost.non_negative("estimated_consumables_cost")?.minor());
        }
        if let Some(price) = input.base_price {
            let price = price.map(|p| p.non_negative("base_price")).transpose()?;
            model.base_price_minor = ActiveValue::Set(price.map(Money::minor));
        }
        Ok(model)
    }

    async fn replace_bom(
        &self,
        db: &DatabaseTransaction,
        shop_id: Uuid,
        template_id: Uuid,
        lines: &[BomItemInput],
    ) -> ResultEngine<()> {
        bom_items::Entity::delete_many()
            .filter(bom_items::Column::TemplateId.eq(template_id))
            .exec(db)
            .await?;

        let now = Utc::now();
        for line in lines {
            if line.quantity.is_negative() || line.quantity.is_zero() {
                return Err(EngineError::InvalidInput(
                    "quantity must be greater than zero".to_string(),
                ));
            }
            let material = self
                .require_material_any(db, shop_id, line.material_id)
                .await?;
            let unit = line
                .unit
                .as_deref()
                .map(normalize_text)
                .filter(|u| !u.is_empty())
                .unwrap_or(material.unit);
            let item = bom_items::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                template_id: ActiveValue::Set(template_id),
                material_id: ActiveValue::Set(material.id),
                quantity_milli: ActiveValue::Set(line.quantity.minor()),
                unit: ActiveValue::Set(unit),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            item.insert(db).await?;
        }
        Ok(())
    }

    async fn replace_equipment_links(
        &self,
        db: &DatabaseTransaction,
        shop_id: Uuid,
        template_id: Uuid,
        equipment_ids: &[Uuid],
    ) -> ResultEngine<()> {
        template_equipment::Entity::delete_many()
            .filter(template_equipment::Column::TemplateId.eq(template_id))
            .exec(db)
            .await?;

        let unique: BTreeSet<Uuid> = equipment_ids.iter().copied().collect();
        for equipment_id in unique {
            self.require_equipment_any(db, shop_id, equipment_id)
                .await?;
            let link = template_equipment::ActiveModel {
                template_id: ActiveValue::Set(template_id),
                equipment_id: ActiveValue::Set(equipment_id),
            };
            link.insert(db).await?;
        }
        Ok(())
    }

    async fn template_detail(
        &self,
        db: &DatabaseTransaction,
        model: product_templates::Model,
    ) -> ResultEngine<TemplateDetail> {
        let mut details = self.template_details(db, vec![model]).await?;
        details
            .pop()
            .ok_or_else(|| EngineError::KeyNotFound("product template not found".to_string()))
    }

    async fn template_details(
        &self,
        db: &DatabaseTransaction,
        rows: Vec<product_templates::Model>,
    ) -> ResultEngine<Vec<TemplateDetail>> {
        let ids: Vec<Uuid> = rows.iter().map(|t| t.id).collect();

        let items = bom_items::Entity::find()
            .filter(bom_items::Column::TemplateId.is_in(ids.clone()))
            .order_by_asc(bom_items::Column::CreatedAt)
            .all(db)
            .await?;
        let material_ids: BTreeSet<Uuid> = items.iter().map(|i| i.material_id).collect();
        let material_names: HashMap<Uuid, String> = materials::Entity::find()
            .filter(materials::Column::Id.is_in(material_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();
        let links = template_equipment::Entity::find()
            .filter(template_equipment::Column::TemplateId.is_in(ids))
            .all(db)
            .await?;

        let mut bom: HashMap<Uuid, Vec<BomLine>> = HashMap::new();
        for item in items {
            let material_name = material_names
                .get(&item.material_id)
                .cloned()
                .unwrap_or_default();
            bom.entry(item.template_id)
                .or_default()
                .push(BomLine { item, material_name });
        }
        let mut equipment: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in links {
            equipment
                .entry(link.template_id)
                .or_default()
                .push(link.equipment_id);
        }

        Ok(rows
            .into_iter()
            .map(|template| TemplateDetail {
                bom: bom.remove(&template.id).unwrap_or_default(),
                equipment_ids: equipment.remove(&template.id).unwrap_or_default(),
                template,
            })
            .collect())
    }
}

