use std::collections::{HashMap, HashSet};

use chrono::{Datelike, TimeZone, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CustomerInput, EngineError, Money, ProjectStatus, ResultEngine, customers, projects, sales,
    shops,
};

use super::{Engine, normalize_required_name, normalize_text, with_tx};

#[derive(Clone, Copy, Debug, Default)]
pub struct CustomerListFilter {
    pub include_inactive: bool,
}

/// A customer decorated with counters derived from its projects and sales.
///
/// Recomputed on every call, never stored.
#[derive(Clone, Debug)]
pub struct CustomerWithMetrics {
    pub customer: customers::Model,
    pub total_projects: u64,
    /// Distinct product templates across the customer's projects and sales.
    pub total_products: u64,
    pub total_sales: u64,
    pub lifetime_revenue: Money,
    pub completed_projects: u64,
    pub projects_this_year: u64,
}

impl CustomerWithMetrics {
    fn empty(customer: customers::Model) -> Self {
        Self {
            customer,
            total_projects: 0,
            total_products: 0,
            total_sales: 0,
            lifetime_revenue: Money::ZERO,
            completed_projects: 0,
            projects_this_year: 0,
        }
    }
}

impl Engine {
    /// Lists customers newest first, then by name.
    pub async fn customers(
        &self,
        user_id: &str,
        filter: CustomerListFilter,
    ) -> ResultEngine<Vec<CustomerWithMetrics>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let mut query = customers::Entity::find().filter(customers::Column::ShopId.eq(shop.id));
            if !filter.include_inactive {
                query = query.filter(customers::Column::IsActive.eq(true));
            }
            let rows = query
                .order_by_desc(customers::Column::CreatedAt)
                .order_by_asc(customers::Column::Name)
                .all(&db_tx)
                .await?;
            self.customer_metrics(&db_tx, &shop, rows).await
        })
    }

    pub async fn customer(&self, user_id: &str, id: Uuid) -> ResultEngine<CustomerWithMetrics> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let model = self.require_customer(&db_tx, shop.id, id).await?;
            let mut rows = self.customer_metrics(&db_tx, &shop, vec![model]).await?;
            rows.pop()
                .ok_or_else(|| EngineError::KeyNotFound("customer not found".to_string()))
        })
    }

    pub async fn create_customer(
        &self,
        user_id: &str,
        input: CustomerInput,
    ) -> ResultEngine<customers::Model> {
        let name = normalize_required_name(input.name.as_deref().unwrap_or_default(), "customer")?;
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let now = Utc::now();
            let model = customers::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                shop_id: ActiveValue::Set(shop.id),
                name: ActiveValue::Set(name),
                email: ActiveValue::Set(String::new()),
                phone: ActiveValue::Set(String::new()),
                channel: ActiveValue::Set(String::new()),
                notes: ActiveValue::Set(String::new()),
                address_line1: ActiveValue::Set(String::new()),
                address_line2: ActiveValue::Set(String::new()),
                city: ActiveValue::Set(String::new()),
                state: ActiveValue::Set(String::new()),
                postal_code: ActiveValue::Set(String::new()),
                country: ActiveValue::Set(String::new()),
                is_active: ActiveValue::Set(input.is_active.unwrap_or(true)),
                is_vip: ActiveValue::Set(input.is_vip.unwrap_or(false)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = apply_customer_input(model, &input);
            Ok(model.insert(&db_tx).await?)
        })
    }

    pub async fn update_customer(
        &self,
        user_id: &str,
        id: Uuid,
        input: CustomerInput,
    ) -> ResultEngine<customers::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let current = self.require_customer(&db_tx, shop.id, id).await?;
            let mut model: customers::ActiveModel = current.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "customer")?);
            }
            if let Some(is_active) = input.is_active {
                model.is_active = ActiveValue::Set(is_active);
            }
            if let Some(is_vip) = input.is_vip {
                model.is_vip = ActiveValue::Set(is_vip);
            }
            let mut model = apply_customer_input(model, &input);
            model.updated_at = ActiveValue::Set(Utc::now());
            Ok(model.update(&db_tx).await?)
        })
    }

    /// Deactivates a customer. Their projects and sales keep the link.
    pub async fn deactivate_customer(&self, user_id: &str, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_customer(&db_tx, shop.id, id).await?;
            let model = customers::ActiveModel {
                id: ActiveValue::Set(id),
                is_active: ActiveValue::Set(false),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            model.update(&db_tx).await?;
            Ok(())
        })
    }

    async fn customer_metrics(
        &self,
        db: &DatabaseTransaction,
        shop: &shops::Model,
        rows: Vec<customers::Model>,
    ) -> ResultEngine<Vec<CustomerWithMetrics>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|c| c.id).collect();

        let project_rows = projects::Entity::find()
            .filter(projects::Column::ShopId.eq(shop.id))
            .filter(projects::Column::CustomerId.is_in(ids.clone()))
            .all(db)
            .await?;
        let sale_rows = sales::Entity::find()
            .filter(sales::Column::ShopId.eq(shop.id))
            .filter(sales::Column::CustomerId.is_in(ids))
            .all(db)
            .await?;

        // "This year" follows the shop's calendar, not UTC.
        let tz = shop.tz();
        let year = Utc::now().with_timezone(&tz).year();

        let mut products: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        let mut metrics: HashMap<Uuid, CustomerWithMetrics> = HashMap::new();
        let order: Vec<Uuid> = rows.iter().map(|c| c.id).collect();
        for row in rows {
            metrics.insert(row.id, CustomerWithMetrics::empty(row));
        }

        for project in project_rows {
            let Some(entry) = project.customer_id.and_then(|id| metrics.get_mut(&id)) else {
                continue;
            };
            entry.total_projects += 1;
            if project.project_status()? == ProjectStatus::Completed {
                entry.completed_projects += 1;
            }
            if tz.from_utc_datetime(&project.created_at.naive_utc()).year() == year {
                entry.projects_this_year += 1;
            }
            if let Some(template_id) = project.template_id {
                products
                    .entry(entry.customer.id)
                    .or_default()
                    .insert(template_id);
            }
        }

        for sale in sale_rows {
            let Some(entry) = sale.customer_id.and_then(|id| metrics.get_mut(&id)) else {
                continue;
            };
            entry.total_sales += 1;
            entry.lifetime_revenue += Money::new(sale.price_minor);
        }

        Ok(order
            .into_iter()
            .filter_map(|id| {
                let mut entry = metrics.remove(&id)?;
                entry.total_products = products.get(&id).map_or(0, |set| set.len() as u64);
                Some(entry)
            })
            .collect())
    }
}

fn apply_customer_input(
    mut model: customers::ActiveModel,
    input: &CustomerInput,
) -> customers::ActiveModel {
    macro_rules! set_text {
        ($($field:ident),*) => {
            $(
                if let Some(value) = input.$field.as_deref() {
                    model.$field = ActiveValue::Set(normalize_text(value));
                }
            )*
        };
    }

    set_text!(
        email,
        phone,
        channel,
        notes,
        address_line1,
        address_line2,
        city,
        state,
        postal_code,
        country
    );
    model
}
