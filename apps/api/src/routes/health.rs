use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Reports liveness and whether a database URL is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "database_configured": state.config.database_configured(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "BackJob API is running!",
        "timestamp": Utc::now().to_rfc3339(),
        "port": state.config.port,
    }))
}
