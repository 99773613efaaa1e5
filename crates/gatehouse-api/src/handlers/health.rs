//! Liveness endpoint.

use axum::Json;
use serde_json::{Value, json};

/// Report service liveness.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "gatehouse" }))
}
