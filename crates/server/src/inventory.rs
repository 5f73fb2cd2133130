//! Materials, consumables and equipment endpoints.
//!
//! `DELETE` archives; `DELETE ?purge=true` removes the row for good.

use api_types::inventory::{
    ConsumableUpsert, ConsumableView, DeleteQuery, EquipmentUpsert, EquipmentView, MaterialUpsert,
    MaterialView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{
    ConsumableInput, EquipmentInput, MaterialInput, Money, Quantity, consumables, equipment,
    materials, users,
};
use uuid::Uuid;

use crate::{ServerError, money, parse_nullable, parse_optional, quantity, server::ServerState};

fn material_view(m: materials::Model) -> MaterialView {
    MaterialView {
        id: m.id,
        name: m.name,
        category: m.category,
        unit: m.unit,
        quantity: quantity(m.quantity_milli),
        cost_per_unit: money(m.cost_per_unit_minor),
        supplier_name: m.supplier_name,
        notes: m.notes,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

fn material_input(payload: MaterialUpsert) -> Result<MaterialInput, ServerError> {
    Ok(MaterialInput {
        quantity: parse_optional::<Quantity>(payload.quantity.as_ref(), "quantity")?,
        cost_per_unit: parse_optional::<Money>(payload.cost_per_unit.as_ref(), "cost_per_unit")?,
        name: payload.name,
        category: payload.category,
        unit: payload.unit,
        supplier_name: payload.supplier_name,
        notes: payload.notes,
    })
}

fn consumable_view(c: consumables::Model) -> ConsumableView {
    ConsumableView {
        id: c.id,
        name: c.name,
        unit: c.unit,
        cost_per_unit: money(c.cost_per_unit_minor),
        quantity: c.quantity_milli.map(quantity),
        notes: c.notes,
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

fn consumable_input(payload: ConsumableUpsert) -> Result<ConsumableInput, ServerError> {
    Ok(ConsumableInput {
        cost_per_unit: parse_optional::<Money>(payload.cost_per_unit.as_ref(), "cost_per_unit")?,
        quantity: parse_nullable::<Quantity>(
            payload.quantity.as_ref().map(Option::as_ref),
            "quantity",
        )?,
        name: payload.name,
        unit: payload.unit,
        notes: payload.notes,
    })
}

fn equipment_view(e: equipment::Model) -> EquipmentView {
    EquipmentView {
        id: e.id,
        name: e.name,
        purchase_date: e.purchase_date,
        purchase_cost: e.purchase_cost_minor.map(money),
        notes: e.notes,
        created_at: e.created_at,
        updated_at: e.updated_at,
    }
}

fn equipment_input(payload: EquipmentUpsert) -> Result<EquipmentInput, ServerError> {
    Ok(EquipmentInput {
        purchase_cost: parse_nullable::<Money>(
            payload.purchase_cost.as_ref().map(Option::as_ref),
            "purchase_cost",
        )?,
        purchase_date: payload.purchase_date,
        name: payload.name,
        notes: payload.notes,
    })
}

/// Generates the list/get/create/update/delete handlers of one inventory type.
macro_rules! inventory_handlers {
    (
        $upsert:ty, $view:ty, $to_view:ident, $to_input:ident,
        $list:ident => $engine_list:ident,
        $get:ident => $engine_get:ident,
        $create:ident => $engine_create:ident,
        $update:ident => $engine_update:ident,
        $delete:ident => $engine_archive:ident / $engine_purge:ident
    ) => {
        pub async fn $list(
            Extension(user): Extension<users::Model>,
            State(state): State<ServerState>,
        ) -> Result<Json<Vec<$view>>, ServerError> {
            let rows = state.engine.$engine_list(&user.username).await?;
            Ok(Json(rows.into_iter().map($to_view).collect()))
        }

        pub async fn $get(
            Extension(user): Extension<users::Model>,
            State(state): State<ServerState>,
            Path(id): Path<Uuid>,
        ) -> Result<Json<$view>, ServerError> {
            let row = state.engine.$engine_get(&user.username, id).await?;
            Ok(Json($to_view(row)))
        }

        pub async fn $create(
            Extension(user): Extension<users::Model>,
            State(state): State<ServerState>,
            Json(payload): Json<$upsert>,
        ) -> Result<(StatusCode, Json<$view>), ServerError> {
            let row = state
                .engine
                .$engine_create(&user.username, $to_input(payload)?)
                .await?;
            Ok((StatusCode::CREATED, Json($to_view(row))))
        }

        pub async fn $update(
            Extension(user): Extension<users::Model>,
            State(state): State<ServerState>,
            Path(id): Path<Uuid>,
            Json(payload): Json<$upsert>,
        ) -> Result<Json<$view>, ServerError> {
            let row = state
                .engine
                .$engine_update(&user.username, id, $to_input(payload)?)
                .await?;
            Ok(Json($to_view(row)))
        }

        pub async fn $delete(
            Extension(user): Extension<users::Model>,
            State(state): State<ServerState>,
            Path(id): Path<Uuid>,
            Query(query): Query<DeleteQuery>,
        ) -> Result<StatusCode, ServerError> {
            if query.purge.unwrap_or(false) {
                state.engine.$engine_purge(&user.username, id).await?;
            } else {
                state.engine.$engine_archive(&user.username, id).await?;
            }
            Ok(StatusCode::NO_CONTENT)
        }
    };
}

inventory_handlers!(
    MaterialUpsert, MaterialView, material_view, material_input,
    list_materials => materials,
    get_material => material,
    create_material => create_material,
    update_material => update_material,
    delete_material => archive_material / purge_material
);

inventory_handlers!(
    ConsumableUpsert, ConsumableView, consumable_view, consumable_input,
    list_consumables => consumables,
    get_consumable => consumable,
    create_consumable => create_consumable,
    update_consumable => update_consumable,
    delete_consumable => archive_consumable / purge_consumable
);

inventory_handlers!(
    EquipmentUpsert, EquipmentView, equipment_view, equipment_input,
    list_equipment => equipment_list,
    get_equipment => equipment,
    create_equipment => create_equipment,
    update_equipment => update_equipment,
    delete_equipment => archive_equipment / purge_equipment
);
