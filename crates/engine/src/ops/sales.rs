use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, SaleChannel, sales};

use super::{Engine, with_tx};

#[derive(Clone, Copy, Debug, Default)]
pub struct SaleListFilter {
    pub channel: Option<SaleChannel>,
}

impl Engine {
    /// Lists sales, most recent first. Sales are read-only once created.
    pub async fn sales(
        &self,
        user_id: &str,
        filter: SaleListFilter,
    ) -> ResultEngine<Vec<sales::Model>> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let mut query = sales::Entity::find().filter(sales::Column::ShopId.eq(shop.id));
            if let Some(channel) = filter.channel {
                query = query.filter(sales::Column::Channel.eq(channel.as_str()));
            }
            Ok(query
                .order_by_desc(sales::Column::SoldAt)
                .order_by_desc(sales::Column::CreatedAt)
                .all(&db_tx)
                .await?)
        })
    }

    pub async fn sale(&self, user_id: &str, id: Uuid) -> ResultEngine<sales::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            self.require_sale(&db_tx, shop.id, id).await
        })
    }
}
