use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};

use std::sync::Arc;

use crate::{
    customers, health, insights, inventory, projects, sales, search, shop, templates, workflows,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Resolves the Basic credentials to a user and stores it in the request
/// extensions. Every handler behind this layer receives `Extension<users::Model>`.
async fn auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(credentials) = request.headers().typed_get::<Authorization<Basic>>() else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if credentials.username().is_empty() || credentials.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let user = match state
        .engine
        .authenticate(credentials.username(), credentials.password())
        .await
    {
        Ok(user) => user,
        Err(engine::EngineError::Database(err)) => {
            tracing::error!("authentication lookup failed: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(_) => {
            tracing::debug!(username = credentials.username(), "rejected credentials");
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/auth/me", get(shop::me))
        .route(
            "/shop",
            get(shop::get)
                .post(shop::create)
                .put(shop::update)
                .patch(shop::update),
        )
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/{id}",
            get(customers::get)
                .put(customers::update)
                .patch(customers::update)
                .delete(customers::delete),
        )
        .route(
            "/materials",
            get(inventory::list_materials).post(inventory::create_material),
        )
        .route(
            "/materials/{id}",
            get(inventory::get_material)
                .put(inventory::update_material)
                .patch(inventory::update_material)
                .delete(inventory::delete_material),
        )
        .route(
            "/consumables",
            get(inventory::list_consumables).post(inventory::create_consumable),
        )
        .route(
            "/consumables/{id}",
            get(inventory::get_consumable)
                .put(inventory::update_consumable)
                .patch(inventory::update_consumable)
                .delete(inventory::delete_consumable),
        )
        .route(
            "/equipment",
            get(inventory::list_equipment).post(inventory::create_equipment),
        )
        .route(
            "/equipment/{id}",
            get(inventory::get_equipment)
                .put(inventory::update_equipment)
                .patch(inventory::update_equipment)
                .delete(inventory::delete_equipment),
        )
        .route(
            "/product-templates",
            get(templates::list).post(templates::create),
        )
        .route(
            "/product-templates/{id}",
            get(templates::get)
                .put(templates::update)
                .patch(templates::update)
                .delete(templates::delete),
        )
        .route("/workflows", get(workflows::list).post(workflows::create))
        .route(
            "/workflows/{id}",
            get(workflows::get)
                .put(workflows::update)
                .patch(workflows::update)
                .delete(workflows::delete),
        )
        .route(
            "/workflows/{id}/stages",
            get(workflows::list_stages).post(workflows::create_stage),
        )
        .route(
            "/workflows/{id}/stages/{stage_id}",
            get(workflows::get_stage)
                .put(workflows::update_stage)
                .patch(workflows::update_stage)
                .delete(workflows::delete_stage),
        )
        .route("/workflows/{id}/board", get(workflows::board))
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .patch(projects::update)
                .delete(projects::delete),
        )
        .route("/projects/{id}/move", post(projects::move_to_stage))
        .route("/projects/{id}/cancel", post(projects::cancel))
        .route("/projects/{id}/log_sale", post(projects::log_sale))
        .route("/projects/{id}/history", get(projects::history))
        .route(
            "/projects/{id}/work-logs",
            get(projects::work_logs).post(projects::add_work_log),
        )
        .route("/sales", get(sales::list))
        .route("/sales/{id}", get(sales::get))
        .route("/insights/summary", get(insights::summary))
        .route("/search", get(search::search))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/health", get(health::health))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}
