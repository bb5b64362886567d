use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;

use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/doctors", schedule_cell::router::schedule_routes(state.clone()))
        .nest("/appointments", appointment_cell::router::appointment_routes(state))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "clinic-api"
    }))
}
