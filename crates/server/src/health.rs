use api_types::health::Health;
use axum::Json;

pub async fn health() -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        message: "ShopOps API is running".to_string(),
    })
}
