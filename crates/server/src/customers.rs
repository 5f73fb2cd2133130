//! Customer endpoints. Metrics are recomputed on every read.

use api_types::{
    Decimal,
    customer::{CustomerListQuery, CustomerUpsert, CustomerView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CustomerInput, CustomerListFilter, CustomerWithMetrics, users};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn customer_view(row: CustomerWithMetrics) -> CustomerView {
    let c = row.customer;
    CustomerView {
        id: c.id,
        name: c.name,
        email: c.email,
        phone: c.phone,
        channel: c.channel,
        notes: c.notes,
        address_line1: c.address_line1,
        address_line2: c.address_line2,
        city: c.city,
        state: c.state,
        postal_code: c.postal_code,
        country: c.country,
        is_active: c.is_active,
        is_vip: c.is_vip,
        total_projects: row.total_projects,
        total_products: row.total_products,
        total_sales: row.total_sales,
        lifetime_revenue: Decimal::new(row.lifetime_revenue),
        completed_projects: row.completed_projects,
        projects_this_year: row.projects_this_year,
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

fn customer_input(payload: CustomerUpsert) -> CustomerInput {
    CustomerInput {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        channel: payload.channel,
        notes: payload.notes,
        address_line1: payload.address_line1,
        address_line2: payload.address_line2,
        city: payload.city,
        state: payload.state,
        postal_code: payload.postal_code,
        country: payload.country,
        is_active: payload.is_active,
        is_vip: payload.is_vip,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<CustomerListQuery>,
) -> Result<Json<Vec<CustomerView>>, ServerError> {
    let filter = CustomerListFilter {
        include_inactive: query.include_inactive.unwrap_or(false),
    };
    let rows = state.engine.customers(&user.username, filter).await?;
    Ok(Json(rows.into_iter().map(customer_view).collect()))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerView>, ServerError> {
    let row = state.engine.customer(&user.username, id).await?;
    Ok(Json(customer_view(row)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CustomerUpsert>,
) -> Result<(StatusCode, Json<CustomerView>), ServerError> {
    let created = state
        .engine
        .create_customer(&user.username, customer_input(payload))
        .await?;
    let row = state.engine.customer(&user.username, created.id).await?;
    Ok((StatusCode::CREATED, Json(customer_view(row))))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerUpsert>,
) -> Result<Json<CustomerView>, ServerError> {
    state
        .engine
        .update_customer(&user.username, id, customer_input(payload))
        .await?;
    let row = state.engine.customer(&user.username, id).await?;
    Ok(Json(customer_view(row)))
}

/// Deactivates the customer; the row and its history stay.
pub async fn delete(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_customer(&user.username, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
