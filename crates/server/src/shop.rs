//! Shop and identity endpoints.

use api_types::{
    Decimal,
    auth::{Me, ShopSummary},
    shop::{ShopUpsert, ShopView},
};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{Money, Percent, ShopInput, Theme, shops, users};

use crate::{ServerError, money, parse_optional, server::ServerState};

pub(crate) fn shop_view(shop: shops::Model) -> ShopView {
    ShopView {
        id: shop.id,
        name: shop.name,
        contact_email: shop.contact_email,
        contact_phone: shop.contact_phone,
        address_line1: shop.address_line1,
        address_line2: shop.address_line2,
        city: shop.city,
        state: shop.state,
        postal_code: shop.postal_code,
        country: shop.country,
        website_url: shop.website_url,
        instagram_handle: shop.instagram_handle,
        facebook_handle: shop.facebook_handle,
        timezone: shop.timezone,
        currency: shop.currency,
        default_units: shop.default_units,
        default_hourly_rate: money(shop.default_hourly_rate_minor),
        default_markup_pct: Decimal::new(Percent::new(shop.default_markup_pct)),
        default_payment_terms: shop.default_payment_terms,
        default_project_type: shop.default_project_type,
        theme: shop.theme,
        tagline: shop.tagline,
        description: shop.description,
        shipping_zones_config: shop.shipping_zones_config,
        joined_at: shop.joined_at,
        last_active_at: shop.last_active_at,
        created_at: shop.created_at,
        updated_at: shop.updated_at,
    }
}

fn shop_input(payload: ShopUpsert) -> Result<ShopInput, ServerError> {
    let theme = payload
        .theme
        .as_deref()
        .map(|t| Theme::try_from(t.trim().to_ascii_lowercase().as_str()))
        .transpose()?;
    Ok(ShopInput {
        default_hourly_rate: parse_optional::<Money>(
            payload.default_hourly_rate.as_ref(),
            "default_hourly_rate",
        )?,
        default_markup_pct: parse_optional::<Percent>(
            payload.default_markup_pct.as_ref(),
            "default_markup_pct",
        )?,
        theme,
        name: payload.name,
        contact_email: payload.contact_email,
        contact_phone: payload.contact_phone,
        address_line1: payload.address_line1,
        address_line2: payload.address_line2,
        city: payload.city,
        state: payload.state,
        postal_code: payload.postal_code,
        country: payload.country,
        website_url: payload.website_url,
        instagram_handle: payload.instagram_handle,
        facebook_handle: payload.facebook_handle,
        timezone: payload.timezone,
        currency: payload.currency,
        default_units: payload.default_units,
        default_payment_terms: payload.default_payment_terms,
        default_project_type: payload.default_project_type,
        tagline: payload.tagline,
        description: payload.description,
        shipping_zones_config: payload.shipping_zones_config,
    })
}

pub async fn me(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Me>, ServerError> {
    let me = state.engine.me(&user.username).await?;
    Ok(Json(Me {
        username: me.user.username,
        email: me.user.email,
        first_name: me.user.first_name,
        last_name: me.user.last_name,
        shop: me.shop.map(|shop| ShopSummary {
            id: shop.id,
            name: shop.name,
            currency: shop.currency,
            timezone: shop.timezone,
        }),
    }))
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ShopView>, ServerError> {
    let shop = state.engine.shop(&user.username).await?;
    Ok(Json(shop_view(shop)))
}

pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ShopUpsert>,
) -> Result<(StatusCode, Json<ShopView>), ServerError> {
    let shop = state
        .engine
        .create_shop(&user.username, shop_input(payload)?)
        .await?;
    Ok((StatusCode::CREATED, Json(shop_view(shop))))
}

/// PUT and PATCH both update only the fields present in the body.
pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ShopUpsert>,
) -> Result<Json<ShopView>, ServerError> {
    let shop = state
        .engine
        .update_shop(&user.username, shop_input(payload)?)
        .await?;
    Ok(Json(shop_view(shop)))
}

