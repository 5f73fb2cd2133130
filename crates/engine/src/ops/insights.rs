//! Shop-wide revenue, cost and project aggregates.

use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{Money, ProjectStatus, ResultEngine, projects, sales};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjectCounts {
    pub active: u64,
    pub completed: u64,
    pub cancelled: u64,
}

/// Every sum defaults to zero.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsightsSummary {
    pub currency: String,
    pub total_revenue: Money,
    pub total_fees: Money,
    pub net_revenue: Money,
    /// Expected price of cancelled projects.
    pub lost_revenue: Money,
    pub project_counts: ProjectCounts,
    pub total_cost_of_goods: Money,
    pub total_gross_margin: Money,
    pub total_platform_fees: Money,
    pub total_shipping_cost: Money,
    pub total_tax_amount: Money,
}

fn sum_optional(values: impl Iterator<Item = Option<i64>>) -> Option<Money> {
    values.flatten().map(Money::new).reduce(|a, b| a + b)
}

impl Engine {
    pub async fn insights_summary(&self, user_id: &str) -> ResultEngine<InsightsSummary> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let sale_rows = sales::Entity::find()
                .filter(sales::Column::ShopId.eq(shop.id))
                .all(&db_tx)
                .await?;
            let project_rows = projects::Entity::find()
                .filter(projects::Column::ShopId.eq(shop.id))
                .all(&db_tx)
                .await?;

            let total_revenue: Money = sale_rows.iter().map(|s| Money::new(s.price_minor)).sum();
            let total_fees = sum_optional(sale_rows.iter().map(|s| s.fees_minor)).unwrap_or_default();
            let total_cost_of_goods =
                sum_optional(sale_rows.iter().map(|s| s.cost_of_goods_minor)).unwrap_or_default();
            // Rows that predate margin tracking carry no margin at all.
            let total_gross_margin = sum_optional(sale_rows.iter().map(|s| s.gross_margin_minor))
                .unwrap_or(total_revenue - total_cost_of_goods);

            let mut counts = ProjectCounts::default();
            let mut lost_revenue = Money::ZERO;
            for project in &project_rows {
                match project.project_status()? {
                    ProjectStatus::Active => counts.active += 1,
                    ProjectStatus::Completed => counts.completed += 1,
                    ProjectStatus::Cancelled => {
                        counts.cancelled += 1;
                        lost_revenue += Money::new(project.expected_price_minor.unwrap_or(0));
                    }
                }
            }

            Ok(InsightsSummary {
                currency: shop.currency,
                total_revenue,
                total_fees,
                net_revenue: total_revenue - total_fees,
                lost_revenue,
                project_counts: counts,
                total_cost_of_goods,
                total_gross_margin,
                total_platform_fees: sum_optional(sale_rows.iter().map(|s| s.platform_fees_minor))
                    .unwrap_or_default(),
                total_shipping_cost: sum_optional(sale_rows.iter().map(|s| s.shipping_cost_minor))
                    .unwrap_or_default(),
                total_tax_amount: sum_optional(sale_rows.iter().map(|s| s.tax_amount_minor))
                    .unwrap_or_default(),
            })
        })
    }
}
