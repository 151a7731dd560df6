use axum::{routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    app_state::AppState,
    modules::{
        admin::routes::admin_routes, availability::routes::availability_routes,
        booking::routes::booking_routes,
    },
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/availability", availability_routes())
        .nest("/slots", booking_routes())
        .nest("/admin", admin_routes())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Petsit Backend says hello!\n"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
