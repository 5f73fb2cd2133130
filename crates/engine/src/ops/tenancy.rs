//! Tenant resolution and the shop profile.
//!
//! Every user owns at most one shop. Operations on any other resource start
//! with [`Engine::require_shop`] and filter every query by the returned
//! shop id.

use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, ShopInput, Theme, shops, users,
    util::{normalize_currency, normalize_timezone},
};

use super::{Engine, normalize_optional_text, normalize_required_name, normalize_text, with_tx};

const NO_SHOP: &str = "Current user has no shop configured.";

/// The caller's identity projection.
#[derive(Clone, Debug)]
pub struct Me {
    pub user: users::Model,
    pub shop: Option<shops::Model>,
}

/// Generates a `require_*` lookup for an entity with a `shop_id` column.
///
/// The `live` form only sees active (non archived) rows.
macro_rules! impl_require_in_shop {
    ($require_fn:ident, $entity:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            shop_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<crate::$entity::Model> {
            crate::$entity::Entity::find_by_id(id)
                .filter(crate::$entity::Column::ShopId.eq(shop_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
    (live $require_fn:ident, $entity:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            shop_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<crate::$entity::Model> {
            crate::$entity::Entity::find_live_by_id(shop_id, id)
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_in_shop!(require_customer, customers, "customer not found");
    impl_require_in_shop!(require_workflow, workflows, "workflow not found");
    impl_require_in_shop!(require_project, projects, "project not found");
    impl_require_in_shop!(require_sale, sales, "sale not found");
    impl_require_in_shop!(require_material_any, materials, "material not found");
    impl_require_in_shop!(require_consumable_any, consumables, "consumable not found");
    impl_require_in_shop!(require_equipment_any, equipment, "equipment not found");
    impl_require_in_shop!(require_template_any, product_templates, "product template not found");
    impl_require_in_shop!(live require_material, materials, "material not found");
    impl_require_in_shop!(live require_consumable, consumables, "consumable not found");
    impl_require_in_shop!(live require_equipment, equipment, "equipment not found");
    impl_require_in_shop!(live require_template, product_templates, "product template not found");

    /// Resolves the shop owned by `user_id`.
    ///
    /// A user without a shop gets `KeyNotFound`, never another tenant's data.
    pub(super) async fn require_shop(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<shops::Model> {
        shops::Entity::find()
            .filter(shops::Column::Owner.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(NO_SHOP.to_string()))
    }

    /// Checks credentials. The username is matched case-insensitively and the
    /// stored (canonical) user is returned.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<users::Model> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::Forbidden("invalid credentials".to_string()));
        }
        let user = users::Entity::find()
            .filter(Expr::cust("LOWER(username)").eq(username.to_lowercase()))
            .one(&self.database)
            .await?;
        match user {
            Some(user) if user.password == password => Ok(user),
            _ => Err(EngineError::Forbidden("invalid credentials".to_string())),
        }
    }

    /// Returns the caller and the shop they own, if any.
    pub async fn me(&self, user_id: &str) -> ResultEngine<Me> {
        with_tx!(self, |db_tx| {
            let user = users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not found".to_string()))?;
            let shop = shops::Entity::find()
                .filter(shops::Column::Owner.eq(user_id))
                .one(&db_tx)
                .await?;
            Ok(Me { user, shop })
        })
    }

    /// Return the caller's shop.
    pub async fn shop(&self, user_id: &str) -> ResultEngine<shops::Model> {
        with_tx!(self, |db_tx| self.require_shop(&db_tx, user_id).await)
    }

    /// Creates the caller's shop. A user owns at most one shop.
    pub async fn create_shop(&self, user_id: &str, input: ShopInput) -> ResultEngine<shops::Model> {
        let name = normalize_required_name(input.name.as_deref().unwrap_or_default(), "shop")?;
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(user_id.to_string())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound("user not found".to_string()));
            }
            let exists = shops::Entity::find()
                .filter(shops::Column::Owner.eq(user_id))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::ExistingKey(
                    "Shop already exists for this user.".to_string(),
                ));
            }

            let now = Utc::now();
            let model = shops::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                owner: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
                contact_email: ActiveValue::Set(None),
                contact_phone: ActiveValue::Set(None),
                address_line1: ActiveValue::Set(None),
                address_line2: ActiveValue::Set(None),
                city: ActiveValue::Set(None),
                state: ActiveValue::Set(None),
                postal_code: ActiveValue::Set(None),
                country: ActiveValue::Set("USA".to_string()),
                website_url: ActiveValue::Set(None),
                instagram_handle: ActiveValue::Set(None),
                facebook_handle: ActiveValue::Set(None),
                timezone: ActiveValue::Set("America/Chicago".to_string()),
                currency: ActiveValue::Set("USD".to_string()),
                default_units: ActiveValue::Set("imperial".to_string()),
                default_hourly_rate_minor: ActiveValue::Set(0),
                default_markup_pct: ActiveValue::Set(0),
                default_payment_terms: ActiveValue::Set("50/50".to_string()),
                default_project_type: ActiveValue::Set(None),
                theme: ActiveValue::Set(Theme::default().as_str().to_string()),
                tagline: ActiveValue::Set(None),
                description: ActiveValue::Set(String::new()),
                shipping_zones_config: ActiveValue::Set(serde_json::json!({})),
                joined_at: ActiveValue::Set(Some(now)),
                last_active_at: ActiveValue::Set(Some(now)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            };
            let model = apply_shop_input(model, input)?;
            let shop = model.insert(&db_tx).await?;
            tracing::info!(shop_id = %shop.id, owner = user_id, "shop created");
            Ok(shop)
        })
    }

    /// Updates the caller's shop and stamps `last_active_at`.
    pub async fn update_shop(&self, user_id: &str, input: ShopInput) -> ResultEngine<shops::Model> {
        with_tx!(self, |db_tx| {
            let shop = self.require_shop(&db_tx, user_id).await?;
            let now = Utc::now();
            let mut model: shops::ActiveModel = shop.into();
            if let Some(name) = input.name.as_deref() {
                model.name = ActiveValue::Set(normalize_required_name(name, "shop")?);
            }
            let mut model = apply_shop_input(model, input)?;
            model.last_active_at = ActiveValue::Set(Some(now));
            model.updated_at = ActiveValue::Set(now);
            Ok(model.update(&db_tx).await?)
        })
    }
}

/// Copies every provided field except `name` onto `model`.
fn apply_shop_input(
    mut model: shops::ActiveModel,
    input: ShopInput,
) -> ResultEngine<shops::ActiveModel> {
    macro_rules! set_nullable {
        ($($field:ident),*) => {
            $(
                if let Some(value) = input.$field.as_deref() {
                    model.$field = ActiveValue::Set(normalize_optional_text(Some(value)));
                }
            )*
        };
    }
    macro_rules! set_text {
        ($($field:ident),*) => {
            $(
                if let Some(value) = input.$field.as_deref() {
                    model.$field = ActiveValue::Set(normalize_text(value));
                }
            )*
        };
    }

    set_nullable!(
        contact_email,
        contact_phone,
        address_line1,
        address_line2,
        city,
        state,
        postal_code,
        website_url,
        instagram_handle,
        facebook_handle,
        default_project_type,
        tagline
    );
    set_text!(country, default_units, default_payment_terms, description);

    if let Some(timezone) = input.timezone.as_deref() {
        model.timezone = ActiveValue::Set(normalize_timezone(timezone)?);
    }
    if let Some(currency) = input.currency.as_deref() {
        model.currency = ActiveValue::Set(normalize_currency(currency)?);
    }
    if let Some(rate) = input.default_hourly_rate {
        model.default_hourly_rate_minor =
            ActiveValue::Set(rate.non_negative("default_hourly_rate")?.minor());
    }
    if let Some(markup) = input.default_markup_pct {
        model.default_markup_pct =
            ActiveValue::Set(markup.non_negative("default_markup_pct")?.minor());
    }
    if let Some(theme) = input.theme {
        model.theme = ActiveValue::Set(theme.as_str().to_string());
    }
    if let Some(config) = input.shipping_zones_config {
        if !config.is_object() {
            return Err(EngineError::InvalidInput(
                "shipping_zones_config must be an object".to_string(),
            ));
        }
        model.shipping_zones_config = ActiveValue::Set(config);
    }
    Ok(model)
}
