use axum::Json;
use serde_json::{json, Value};

/// Lightweight health endpoint for evaluator infrastructure probes.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
