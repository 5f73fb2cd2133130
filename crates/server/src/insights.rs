use api_types::{
    Decimal,
    insights::{CostsAndMargins, ProjectCounts, Summary},
};
use axum::{Extension, Json, extract::State};
use engine::users;

use crate::{ServerError, server::ServerState};

pub async fn summary(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Summary>, ServerError> {
    let s = state.engine.insights_summary(&user.username).await?;
    Ok(Json(Summary {
        currency: s.currency,
        total_revenue: Decimal::new(s.total_revenue),
        total_fees: Decimal::new(s.total_fees),
        net_revenue: Decimal::new(s.net_revenue),
        lost_revenue: Decimal::new(s.lost_revenue),
        project_counts: ProjectCounts {
            active: s.project_counts.active,
            completed: s.project_counts.completed,
            cancelled: s.project_counts.cancelled,
        },
        costs_and_margins: CostsAndMargins {
            total_cost_of_goods: Decimal::new(s.total_cost_of_goods),
            total_gross_margin: Decimal::new(s.total_gross_margin),
            total_platform_fees: Decimal::new(s.total_platform_fees),
            total_shipping_cost: Decimal::new(s.total_shipping_cost),
            total_tax_amount: Decimal::new(s.total_tax_amount),
        },
    }))
}
