//! HTTP request handlers organized by functionality

pub mod addon;

use axum::Json;
use serde_json::{Value, json};

pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
