use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::{Engine as _, prelude::BASE64_STANDARD};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    for username in ["alice", "bob"] {
        db.execute(Statement::from_sql_and_values(
            db.get_database_backend(),
            "INSERT INTO users (username, password) VALUES (?, ?)",
            vec![username.into(), "secret".into()],
        ))
        .await
        .unwrap();
    }
    let engine = Engine::builder().database(db).build().await.unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

fn basic(user: &str) -> String {
    format!("Basic {}", BASE64_STANDARD.encode(format!("{user}:secret")))
}

async fn call(app: &Router, method: Method, uri: &str, user: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic(user));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn setup_shop(app: &Router, user: &str) -> Value {
    let (status, _) = call(
        app,
        Method::POST,
        "/shop",
        user,
        Some(json!({"name": "Sawdust", "currency": "USD"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, workflow) = call(
        app,
        Method::POST,
        "/workflows",
        user,
        Some(json!({
            "name": "Default",
            "is_default": true,
            "stages": [
                {"name": "Idea", "order": 0, "key": "idea"},
                {"name": "Build", "order": 1, "key": "build"},
                {"name": "Completed", "order": 2, "key": "completed"}
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    workflow
}

#[tokio::test]
async fn health_needs_no_credentials() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_401() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(Request::get("/shop").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let wrong = format!("Basic {}", BASE64_STANDARD.encode("alice:nope"));
    let response = app
        .clone()
        .oneshot(
            Request::get("/shop")
                .header(header::AUTHORIZATION, wrong)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn shop_lifecycle() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/shop", "alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Current user has no shop configured.");

    let (status, me) = call(&app, Method::GET, "/auth/me", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert!(me["shop"].is_null());

    setup_shop(&app, "alice").await;
    let (status, body) = call(
        &app,
        Method::POST,
        "/shop",
        "alice",
        Some(json!({"name": "Again"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Shop already exists for this user.");

    let (status, shop) = call(
        &app,
        Method::PATCH,
        "/shop",
        "alice",
        Some(json!({"tagline": "Handmade", "default_hourly_rate": "45.50"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shop["tagline"], "Handmade");
    assert_eq!(shop["default_hourly_rate"], "45.50");
    assert_eq!(shop["name"], "Sawdust");
    assert!(shop["last_active_at"].is_string());
}

#[tokio::test]
async fn project_flow_end_to_end() {
    let app = app().await;
    let workflow = setup_shop(&app, "alice").await;
    let stages = workflow["stages"].as_array().unwrap();
    let stage0 = stages[0]["id"].as_str().unwrap().to_string();
    let stage1 = stages[1]["id"].as_str().unwrap().to_string();

    let (status, template) = call(
        &app,
        Method::POST,
        "/product-templates",
        "alice",
        Some(json!({"name": "Walnut table", "base_price": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(template["base_price"], "100.00");

    let (status, project) = call(
        &app,
        Method::POST,
        "/projects",
        "alice",
        Some(json!({"template_id": template["id"], "quantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(project["expected_price"], "200.00");
    assert_eq!(project["current_stage_id"], stage0.as_str());
    assert_eq!(project["status"], "active");
    let id = project["id"].as_str().unwrap().to_string();

    let (status, moved) = call(
        &app,
        Method::POST,
        &format!("/projects/{id}/move"),
        "alice",
        Some(json!({"stage_id": stage1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(moved["current_stage_id"], stage1.as_str());

    let (_, history) = call(&app, Method::GET, &format!("/projects/{id}/history"), "alice", None).await;
    assert_eq!(history.as_array().unwrap().len(), 2);

    let (status, logged) = call(
        &app,
        Method::POST,
        &format!("/projects/{id}/log_sale"),
        "alice",
        Some(json!({"price": "210.00", "channel": "etsy", "fees": "21.00"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(logged["project"]["status"], "completed");
    assert_eq!(logged["sale"]["price"], "210.00");
    assert_eq!(logged["sale"]["currency"], "USD");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/projects/{id}/log_sale"),
        "alice",
        Some(json!({"price": "210.00", "channel": "etsy"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Only active projects can log a sale.");

    let (_, sales) = call(&app, Method::GET, "/sales?channel=etsy", "alice", None).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);

    let (status, summary) = call(&app, Method::GET, "/insights/summary", "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_revenue"], "210.00");
    assert_eq!(summary["net_revenue"], "189.00");
    assert_eq!(summary["project_counts"]["completed"], 1);
    assert_eq!(summary["costs_and_margins"]["total_gross_margin"], "210.00");

    let workflow_id = workflow["id"].as_str().unwrap();
    let (status, board) = call(
        &app,
        Method::GET,
        &format!("/workflows/{workflow_id}/board"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let columns = board["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 3);
    assert!(columns.iter().all(|c| c["projects"].as_array().unwrap().is_empty()));
}

#[tokio::test]
async fn validation_errors_are_400_with_detail() {
    let app = app().await;
    setup_shop(&app, "alice").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/materials",
        "alice",
        Some(json!({"name": "Oak", "unit": "bf", "cost_per_unit": "12.345"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("cost_per_unit"));

    let (status, body) = call(&app, Method::POST, "/projects", "alice", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "A product template is required to create a project."
    );

    let (status, _) = call(&app, Method::GET, "/search?q=status:bogus", "alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::GET,
        "/search?q=customer:%20status:cancelled",
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "status filter does not apply to customer search");
}

#[tokio::test]
async fn cancel_rejects_non_numeric_expected_price() {
    let app = app().await;
    setup_shop(&app, "alice").await;
    let (_, template) = call(
        &app,
        Method::POST,
        "/product-templates",
        "alice",
        Some(json!({"name": "Stool", "base_price": "40"})),
    )
    .await;
    let (_, project) = call(
        &app,
        Method::POST,
        "/projects",
        "alice",
        Some(json!({"template_id": template["id"], "quantity": 1})),
    )
    .await;
    let id = project["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/projects/{id}/cancel"),
        "alice",
        Some(json!({"reason": "client left", "expected_price": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "expected_price: invalid amount");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/projects/{id}/log_sale"),
        "alice",
        Some(json!({"price": "50000000000000000", "channel": "etsy"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "price: amount too large");

    let (status, unchanged) = call(&app, Method::GET, &format!("/projects/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(unchanged["status"], "active");
    assert_eq!(unchanged["expected_price"], "40.00");
    assert!(unchanged["cancelled_at"].is_null());
}

#[tokio::test]
async fn inventory_delete_archives_and_purge_is_protected() {
    let app = app().await;
    setup_shop(&app, "alice").await;

    let (_, material) = call(
        &app,
        Method::POST,
        "/materials",
        "alice",
        Some(json!({"name": "Walnut", "unit": "bf", "quantity": "3.5"})),
    )
    .await;
    assert_eq!(material["quantity"], "3.500");
    let material_id = material["id"].as_str().unwrap().to_string();

    call(
        &app,
        Method::POST,
        "/product-templates",
        "alice",
        Some(json!({
            "name": "Board",
            "bom": [{"material_id": material_id, "quantity": "1.25"}]
        })),
    )
    .await;

    let (status, body) = call(
        &app,
        Method::DELETE,
        &format!("/materials/{material_id}?purge=true"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("bill of materials"));

    let (status, _) = call(
        &app,
        Method::DELETE,
        &format!("/materials/{material_id}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = call(&app, Method::GET, "/materials", "alice", None).await;
    assert!(list.as_array().unwrap().is_empty());
    let (status, _) = call(
        &app,
        Method::GET,
        &format!("/materials/{material_id}"),
        "alice",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn other_tenants_get_404() {
    let app = app().await;
    setup_shop(&app, "alice").await;
    setup_shop(&app, "bob").await;

    let (_, customer) = call(
        &app,
        Method::POST,
        "/customers",
        "alice",
        Some(json!({"name": "Jane"})),
    )
    .await;
    assert_eq!(customer["lifetime_revenue"], "0.00");
    let id = customer["id"].as_str().unwrap();

    let (status, _) = call(&app, Method::GET, &format!("/customers/{id}"), "bob", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, list) = call(&app, Method::GET, "/customers", "bob", None).await;
    assert!(list.as_array().unwrap().is_empty());

    let (status, _) = call(&app, Method::DELETE, &format!("/customers/{id}"), "alice", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = call(&app, Method::GET, "/customers", "alice", None).await;
    assert!(list.as_array().unwrap().is_empty());
    let (_, list) = call(
        &app,
        Method::GET,
        "/customers?include_inactive=true",
        "alice",
        None,
    )
    .await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}
