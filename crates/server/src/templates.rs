//! Product template endpoints.

use api_types::template::{BomItemView, TemplateUpsert, TemplateView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{BomItemInput, Hours, Money, Quantity, TemplateDetail, TemplateInput, users};
use uuid::Uuid;

use crate::{
    ServerError, hours, money, parse_decimal, parse_nullable, parse_optional, quantity,
    server::ServerState,
};

fn template_view(detail: TemplateDetail) -> TemplateView {
    let t = detail.template;
    TemplateView {
        id: t.id,
        name: t.name,
        description: t.description,
        category: t.category,
        workflow_id: t.workflow_id,
        estimated_labor_hours: hours(t.estimated_labor_hours),
        hourly_rate: t.hourly_rate_minor.map(money),
        estimated_consumables_cost: money(t.estimated_consumables_cost_minor),
        average_material_cost: t.average_material_cost_minor.map(money),
        average_consumable_cost: t.average_consumable_cost_minor.map(money),
        base_price: t.base_price_minor.map(money),
        bom: detail
            .bom
            .into_iter()
            .map(|line| BomItemView {
                id: line.item.id,
                material_id: line.item.material_id,
                material_name: line.material_name,
                quantity: quantity(line.item.quantity_milli),
                unit: line.item.unit,
            })
            .collect(),
        equipment_ids: detail.equipment_ids,
        created_at: t.created_at,
        updated_at: t.updated_at,
    }
}

fn template_input(payload: TemplateUpsert) -> Result<TemplateInput, ServerError> {
    let bom = payload
        .bom
        .map(|items| {
            items
                .into_iter()
                .map(|item| {
                    Ok(BomItemInput {
                        material_id: item.material_id,
                        quantity: parse_decimal::<Quantity>(&item.quantity, "bom quantity")?,
                        unit: item.unit,
                    })
                })
                .collect::<Result<Vec<_>, ServerError>>()
        })
        .transpose()?;

    Ok(TemplateInput {
        estimated_labor_hours: parse_optional::<Hours>(
            payload.estimated_labor_hours.as_ref(),
            "estimated_labor_hours",
        )?,
        hourly_rate: parse_nullable::<Money>(
            payload.hourly_rate.as_ref().map(Option::as_ref),
            "hourly_rate",
        )?,
        estimated_consumables_cost: parse_optional::<Money>(
            payload.estimated_consumables_cost.as_ref(),
            "estimated_consumables_cost",
        )?,
        base_price: parse_nullable::<Money>(
            payload.base_price.as_ref().map(Option::as_ref),
            "base_price",
        )?,
        bom,
        name: payload.name,
        description: payload.description,
        category: payload.category,
        workflow_id: payload.workflow_id,
        equipment_ids: payload.equipment_ids,
    })
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<TemplateView>>, ServerError> {
    let rows = state.engine.templates(&user.username).await?;
    Ok(Json(rows.into_iter().map(template_view).collect()))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TemplateView>, ServerError> {
    let detail = state.engine.template(&user.username, id).await?;
    Ok(Json(template_view(detail)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TemplateUpsert>,
) -> Result<(StatusCode, Json<TemplateView>), ServerError> {
    let detail = state
        .engine
        .create_template(&user.username, template_input(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(template_view(detail))))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TemplateUpsert>,
) -> Result<Json<TemplateView>, ServerError> {
    let detail = state
        .engine
        .update_template(&user.username, id, template_input(payload)?)
        .await?;
    Ok(Json(template_view(detail)))
}

/// Templates are archived, never removed.
pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.archive_template(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
