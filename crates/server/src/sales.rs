//! Read-only sales endpoints. Sales are created by `log_sale`.

use api_types::sale::{SaleListQuery, SaleView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{SaleChannel, SaleListFilter, sales, users};
use uuid::Uuid;

use crate::{ServerError, money, server::ServerState};

pub(crate) fn sale_view(s: sales::Model) -> SaleView {
    SaleView {
        id: s.id,
        project_id: s.project_id,
        template_id: s.template_id,
        customer_id: s.customer_id,
        channel: s.channel,
        price: money(s.price_minor),
        fees: s.fees_minor.map(money),
        currency: s.currency,
        sold_at: s.sold_at,
        notes: s.notes,
        cost_of_goods: s.cost_of_goods_minor.map(money),
        gross_margin: s.gross_margin_minor.map(money),
        platform_fees: s.platform_fees_minor.map(money),
        shipping_cost: s.shipping_cost_minor.map(money),
        tax_amount: s.tax_amount_minor.map(money),
        created_at: s.created_at,
    }
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<SaleListQuery>,
) -> Result<Json<Vec<SaleView>>, ServerError> {
    let channel = query
        .channel
        .as_deref()
        .map(SaleChannel::try_from)
        .transpose()?;
    let rows = state
        .engine
        .sales(&user.username, SaleListFilter { channel })
        .await?;
    Ok(Json(rows.into_iter().map(sale_view).collect()))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SaleView>, ServerError> {
    let sale = state.engine.sale(&user.username, id).await?;
    Ok(Json(sale_view(sale)))
}
