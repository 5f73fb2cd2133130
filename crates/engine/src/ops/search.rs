//! Executes a parsed [`SearchQuery`] with one searcher per entity type.

use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*, sea_query::LikeExpr,
};
use uuid::Uuid;

use crate::{
    Money, ProjectStatus, ResultEngine, consumables, customers, equipment, materials,
    product_templates, projects,
    search::{DueFilter, PER_TYPE_LIMIT, SearchHit, SearchQuery, SearchScope},
    shops, workflow_stages,
};

use super::{Engine, with_tx};

impl Engine {
    /// Runs `query` against the caller's shop. Each entity type contributes
    /// at most five hits, in the order customers, projects, materials,
    /// consumables, equipment.
    pub async fn search(&self, user_id: &str, query: &SearchQuery) -> ResultEngine<Vec<SearchHit>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let mut hits = Vec::new();
            if query.is_empty() {
                return Ok(hits);
            }
            if query.searches(SearchScope::Customers) {
                hits.extend(search_customers(&db_tx, shop.id, query).await?);
            }
            if query.searches(SearchScope::Projects) {
                hits.extend(search_projects(&db_tx, &shop, query).await?);
            }
            if query.searches(SearchScope::Materials) {
                hits.extend(search_materials(&db_tx, shop.id, query).await?);
            }
            if query.searches(SearchScope::Consumables) {
                hits.extend(search_consumables(&db_tx, shop.id, query).await?);
            }
            if query.searches(SearchScope::Equipment) {
                hits.extend(search_equipment(&db_tx, shop.id, query).await?);
            }
            Ok(hits)
        })
    }
}

/// Escapes LIKE wildcards so user text matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn containing(value: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(value))).escape('\\')
}

fn equal_to(value: &str) -> LikeExpr {
    LikeExpr::new(escape_like(value)).escape('\\')
}

fn first_non_empty(values: &[&str]) -> String {
    values
        .iter()
        .find(|v| !v.is_empty())
        .map(ToString::to_string)
        .unwrap_or_default()
}

async fn search_customers(
    db: &DatabaseTransaction,
    shop_id: Uuid,
    query: &SearchQuery,
) -> ResultEngine<Vec<SearchHit>> {
    let mut select = customers::Entity::find()
        .filter(customers::Column::ShopId.eq(shop_id))
        .filter(customers::Column::IsActive.eq(true));
    if !query.text.is_empty() {
        select = select.filter(
            Condition::any()
                .add(customers::Column::Name.like(containing(&query.text)))
                .add(customers::Column::Email.like(containing(&query.text)))
                .add(customers::Column::Phone.like(containing(&query.text))),
        );
    }
    let rows = select
        .order_by_asc(customers::Column::Name)
        .limit(PER_TYPE_LIMIT)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|c| SearchHit {
            kind: "customer",
            id: c.id,
            subtitle: first_non_empty(&[&c.email, &c.phone, &c.channel]),
            label: c.name,
            url: format!("/customers/{}", c.id),
        })
        .collect())
}

async fn search_projects(
    db: &DatabaseTransaction,
    shop: &shops::Model,
    query: &SearchQuery,
) -> ResultEngine<Vec<SearchHit>> {
    let filters = &query.filters;
    let mut select = projects::Entity::find().filter(projects::Column::ShopId.eq(shop.id));
    if !query.text.is_empty() {
        select = select.filter(projects::Column::Name.like(containing(&query.text)));
    }
    if let Some(status) = filters.status {
        select = select.filter(projects::Column::Status.eq(status.as_str()));
    }
    if let Some(due) = filters.due {
        let today = Utc::now().with_timezone(&shop.tz()).date_naive();
        select = match due {
            DueFilter::Today => select.filter(projects::Column::DueDate.eq(today)),
            DueFilter::Overdue => select
                .filter(projects::Column::DueDate.lt(today))
                .filter(projects::Column::Status.eq(ProjectStatus::Active.as_str())),
        };
    }
    if filters.price.is_some() {
        select = select.filter(projects::Column::ExpectedPriceMinor.is_not_null());
    }
    let rows = select
        .order_by_desc(projects::Column::CreatedAt)
        .all(db)
        .await?;

    let stage_ids: BTreeSet<Uuid> = rows.iter().map(|p| p.current_stage_id).collect();
    let stages: HashMap<Uuid, workflow_stages::Model> = workflow_stages::Entity::find()
        .filter(workflow_stages::Column::Id.is_in(stage_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let categories: HashMap<Uuid, String> = if filters.tag.is_some() {
        let template_ids: BTreeSet<Uuid> = rows.iter().filter_map(|p| p.template_id).collect();
        product_templates::Entity::find()
            .filter(product_templates::Column::Id.is_in(template_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|t| (t.id, t.category))
            .collect()
    } else {
        HashMap::new()
    };

    let hits = rows
        .into_iter()
        .filter(|p| {
            let price_ok = filters.price.is_none_or(|f| {
                p.expected_price_minor
                    .is_some_and(|minor| f.matches(Money::new(minor)))
            });
            let stage_ok = filters.stage.as_deref().is_none_or(|wanted| {
                stages.get(&p.current_stage_id).is_some_and(|stage| {
                    stage.key.eq_ignore_ascii_case(wanted)
                        || stage.name.to_lowercase().contains(&wanted.to_lowercase())
                })
            });
            let tag_ok = filters.tag.as_deref().is_none_or(|tag| {
                p.template_id
                    .and_then(|id| categories.get(&id))
                    .is_some_and(|category| category.eq_ignore_ascii_case(tag))
            });
            price_ok && stage_ok && tag_ok
        })
        .take(PER_TYPE_LIMIT as usize)
        .map(|p| {
            let stage = stages
                .get(&p.current_stage_id)
                .map(|s| s.name.as_str())
                .unwrap_or_default();
            SearchHit {
                kind: "project",
                id: p.id,
                subtitle: format!("{} - {stage}", p.status),
                label: p.name,
                url: format!("/projects/{}", p.id),
            }
        })
        .collect();
    Ok(hits)
}

async fn search_materials(
    db: &DatabaseTransaction,
    shop_id: Uuid,
    query: &SearchQuery,
) -> ResultEngine<Vec<SearchHit>> {
    let mut select = materials::Entity::find_live(shop_id);
    if !query.text.is_empty() {
        select = select.filter(
            Condition::any()
                .add(materials::Column::Name.like(containing(&query.text)))
                .add(materials::Column::Category.like(containing(&query.text)))
                .add(materials::Column::SupplierName.like(containing(&query.text))),
        );
    }
    if let Some(tag) = query.filters.tag.as_deref() {
        select = select.filter(materials::Column::Category.like(equal_to(tag)));
    }
    let rows = select
        .order_by_asc(materials::Column::Name)
        .limit(PER_TYPE_LIMIT)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|m| SearchHit {
            kind: "material",
            id: m.id,
            subtitle: first_non_empty(&[&m.category, &m.supplier_name]),
            label: m.name,
            url: format!("/materials/{}", m.id),
        })
        .collect())
}

async fn search_consumables(
    db: &DatabaseTransaction,
    shop_id: Uuid,
    query: &SearchQuery,
) -> ResultEngine<Vec<SearchHit>> {
    let mut select = consumables::Entity::find_live(shop_id);
    if !query.text.is_empty() {
        select = select.filter(consumables::Column::Name.like(containing(&query.text)));
    }
    let rows = select
        .order_by_asc(consumables::Column::Name)
        .limit(PER_TYPE_LIMIT)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|c| SearchHit {
            kind: "consumable",
            id: c.id,
            subtitle: c.unit.clone(),
            label: c.name,
            url: format!("/consumables/{}", c.id),
        })
        .collect())
}

async fn search_equipment(
    db: &DatabaseTransaction,
    shop_id: Uuid,
    query: &SearchQuery,
) -> ResultEngine<Vec<SearchHit>> {
    let mut select = equipment::Entity::find_live(shop_id);
    if !query.text.is_empty() {
        select = select.filter(
            Condition::any()
                .add(equipment::Column::Name.like(containing(&query.text)))
                .add(equipment::Column::Notes.like(containing(&query.text))),
        );
    }
    let rows = select
        .order_by_asc(equipment::Column::Name)
        .limit(PER_TYPE_LIMIT)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|e| SearchHit {
            kind: "equipment",
            id: e.id,
            subtitle: e
                .purchase_date
                .map(|d| format!("purchased {d}"))
                .unwrap_or_default(),
            label: e.name,
            url: format!("/equipment/{}", e.id),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("walnut"), "walnut");
    }
}
